use std::io::{self, Write};

use crate::{
    entities::movie,
    error::AppResult,
    models::{self, WatchOutcome},
    store::{self, Store},
};

const MENU: &str = "\
Please select one of the following options:
1) Add new movies.
2) View upcoming movies.
3) View all movies.
4) Watch a movie.
5) View watched movies.
6) Add user to the app.
7) Search movies.
8) Plan to watch a movie.
9) View planned movies.
10) See all reviews for a movie.
11) Exit.
Your selection: ";

/// Menu loop; returns when the exit option is chosen. Validation failures are
/// printed and never abort the loop.
pub async fn run(store: &Store) -> AppResult<()> {
    println!("Welcome to the watchlist app!");

    loop {
        match prompt(MENU)?.as_str() {
            "1" => add_movie(store).await?,
            "2" => print_movies("Upcoming", &store.upcoming_movies(store::now_sec()).await?),
            "3" => print_movies("All", &store.all_movies().await?),
            "4" => watch_movie(store).await?,
            "5" => show_watched_movies(store).await?,
            "6" => add_user(store).await?,
            "7" => search_movies(store).await?,
            "8" => plan_movie(store).await?,
            "9" => show_planned_movies(store).await?,
            "10" => show_reviews_for_movie(store).await?,
            "11" => break,
            _ => println!("Invalid input, please try again!"),
        }
    }

    Ok(())
}

async fn add_movie(store: &Store) -> AppResult<()> {
    let title = prompt("Movie title: ")?;
    if title.is_empty() {
        println!("Movie title is required.");
        return Ok(());
    }

    let release_date = prompt("Release date (dd-mm-YYYY): ")?;
    let timestamp = match models::parse_release_date(&release_date) {
        Ok(ts) => ts,
        Err(err) => {
            println!("Could not parse release date '{release_date}': {err}");
            return Ok(());
        }
    };

    store.add_movie(&title, timestamp).await?;
    Ok(())
}

async fn add_user(store: &Store) -> AppResult<()> {
    let username = prompt("Username: ")?;
    if username.is_empty() {
        println!("Username is required.");
        return Ok(());
    }

    if !store.add_user(&username).await? {
        println!("User '{username}' already exists.");
    }
    Ok(())
}

async fn watch_movie(store: &Store) -> AppResult<()> {
    let Some((username, movie_id)) = pick_user_and_movie(store).await? else {
        return Ok(());
    };

    let review = prompt_optional("Enter your review (optional): ")?;
    let rating = parse_rating(&prompt("Enter your rating out of 100 (optional): ")?);

    let outcome = store.watch_movie(&username, movie_id, review, rating).await?;
    if outcome == WatchOutcome::AlreadyWatched {
        println!("User '{username}' has already marked movie ID {movie_id} as watched.");
    }
    Ok(())
}

async fn show_watched_movies(store: &Store) -> AppResult<()> {
    let username = prompt("Username: ")?;
    let watched = store.watched_movies(&username).await?;
    if watched.is_empty() {
        println!("{username} has watched no movies yet!");
        return Ok(());
    }

    println!("-- Watched movies --");
    for entry in &watched {
        print_movie_line(&entry.movie);
        if let Some(review) = &entry.review {
            println!("   Review: {review}");
        }
        if let Some(rating) = entry.rating {
            println!("   Rating: {rating}/100");
        }
    }
    println!("----\n");
    Ok(())
}

async fn search_movies(store: &Store) -> AppResult<()> {
    let term = prompt("Enter the partial movie title: ")?;
    let movies = store.search_movies(&term).await?;
    if movies.is_empty() {
        println!("No matching movies found for |{term}| !");
    } else {
        print_movies("Movies found", &movies);
    }
    Ok(())
}

async fn plan_movie(store: &Store) -> AppResult<()> {
    let Some((username, movie_id)) = pick_user_and_movie(store).await? else {
        return Ok(());
    };

    let expectation = prompt_optional("What are your expectations for this movie? (optional): ")?;

    if store.plan_movie(&username, movie_id, expectation).await? {
        println!("Movie ID {movie_id} planned for user '{username}'.");
    } else {
        println!("User '{username}' has already planned movie ID {movie_id}.");
    }
    Ok(())
}

async fn show_planned_movies(store: &Store) -> AppResult<()> {
    let username = prompt("Username: ")?;
    let planned = store.planned_movies(&username).await?;
    if planned.is_empty() {
        println!("{username} has no planned movies yet!");
        return Ok(());
    }

    println!("-- Planned movies --");
    for entry in &planned {
        print_movie_line(&entry.movie);
        if let Some(expectation) = &entry.expectation {
            println!("   Expectation: {expectation}");
        }
    }
    println!("----\n");
    Ok(())
}

async fn show_reviews_for_movie(store: &Store) -> AppResult<()> {
    let movies = store.all_movies().await?;
    if movies.is_empty() {
        println!("No movies found. Please add a movie first.");
        return Ok(());
    }
    print_movie_index(&movies);

    let input = prompt("Enter the Movie ID to see all reviews: ")?;
    let Some(movie_id) = parse_movie_id(&input, &movies) else {
        println!("Invalid Movie ID.");
        return Ok(());
    };

    let reviews = store.reviews_for_movie(movie_id).await?;
    if reviews.is_empty() {
        println!("No reviews or ratings found for this movie.");
        return Ok(());
    }

    println!("-- Reviews for movie ID {movie_id} --");
    for review in &reviews {
        println!("User: {}", review.username);
        if let Some(text) = &review.review {
            println!("  Review: {text}");
        }
        if let Some(rating) = review.rating {
            println!("  Rating: {rating}/100");
        }
        println!("----");
    }
    Ok(())
}

/// Shared preamble of the watch/plan flows: list users and movies, then read
/// and validate a username and movie id against what was listed.
async fn pick_user_and_movie(store: &Store) -> AppResult<Option<(String, i32)>> {
    let users = store.all_users().await?;
    if users.is_empty() {
        println!("No users found. Please add a user first.");
        return Ok(None);
    }
    println!("Available users:");
    for user in &users {
        println!("- {user}");
    }

    let movies = store.all_movies().await?;
    if movies.is_empty() {
        println!("No movies found. Please add a movie first.");
        return Ok(None);
    }
    print_movie_index(&movies);

    let username = prompt("Username: ")?;
    if !users.contains(&username) {
        println!("User '{username}' does not exist! Please add the user first.");
        return Ok(None);
    }

    let input = prompt("Movie ID: ")?;
    let Some(movie_id) = parse_movie_id(&input, &movies) else {
        println!("Movie ID '{input}' does not exist! Please enter a valid movie ID.");
        return Ok(None);
    };

    Ok(Some((username, movie_id)))
}

fn print_movie_index(movies: &[movie::Model]) {
    println!("Available movies:");
    for movie in movies {
        println!("{}: {}", movie.id, movie.title);
    }
}

fn print_movies(heading: &str, movies: &[movie::Model]) {
    println!("-- {heading} movies --");
    for movie in movies {
        print_movie_line(movie);
    }
    println!("----\n");
}

fn print_movie_line(movie: &movie::Model) {
    println!(
        "{}: {} (on {})",
        movie.id,
        movie.title,
        models::format_release_date(movie.release_timestamp)
    );
}

fn parse_movie_id(input: &str, movies: &[movie::Model]) -> Option<i32> {
    let id = input.parse().ok()?;
    movies.iter().any(|m| m.id == id).then_some(id)
}

/// Ratings are accepted only when the input is all digits.
fn parse_rating(input: &str) -> Option<i32> {
    let trimmed = input.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    trimmed.parse().ok()
}

fn prompt(text: &str) -> AppResult<String> {
    print!("{text}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn prompt_optional(text: &str) -> AppResult<Option<String>> {
    let value = prompt(text)?;
    Ok((!value.is_empty()).then_some(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: i32, title: &str) -> movie::Model {
        movie::Model {
            id,
            title: title.to_string(),
            release_timestamp: 0,
        }
    }

    #[test]
    fn rating_accepts_digits_only() {
        assert_eq!(parse_rating("85"), Some(85));
        assert_eq!(parse_rating(" 100 "), Some(100));
        assert_eq!(parse_rating(""), None);
        assert_eq!(parse_rating("-5"), None);
        assert_eq!(parse_rating("ninety"), None);
        assert_eq!(parse_rating("8.5"), None);
    }

    #[test]
    fn movie_id_must_match_a_listed_movie() {
        let movies = [movie(1, "Alien"), movie(7, "Heat")];
        assert_eq!(parse_movie_id("7", &movies), Some(7));
        assert_eq!(parse_movie_id("2", &movies), None);
        assert_eq!(parse_movie_id("seven", &movies), None);
    }
}
