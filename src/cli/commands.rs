use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;

use crate::api::models::{PantrySearchResponse, RecipeListResponse};
use crate::utils::sanitize::truncate;
use crate::{Error, Result};

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Turn a non-success response into an error carrying the server's message
async fn error_from_response(response: Response) -> Error {
    let status = response.status();
    let message = response
        .json::<ErrorBody>()
        .await
        .map(|body| body.error)
        .unwrap_or_else(|_| format!("Server returned {status}"));

    match status {
        StatusCode::BAD_REQUEST => Error::Validation(message),
        StatusCode::NOT_FOUND => Error::NotFound(message),
        _ => Error::Internal(message),
    }
}

/// Ask a running server which recipes the given ingredients can make
pub async fn pantry(
    server_url: &str,
    ingredients: &[String],
    limit: Option<usize>,
) -> Result<PantrySearchResponse> {
    let client = Client::new();

    let mut body = serde_json::json!({ "ingredients": ingredients });
    if let Some(limit) = limit {
        body["limit"] = serde_json::json!(limit);
    }

    let response = client
        .post(format!("{server_url}/api/ai/pantry-search-simple"))
        .json(&body)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }

    let results: PantrySearchResponse = response.json().await?;
    print_pantry_results(&results);

    Ok(results)
}

/// Search published recipes on a running server
pub async fn search(
    server_url: &str,
    query: &str,
    difficulty: Option<String>,
    max_time: Option<i64>,
    category: Option<String>,
) -> Result<RecipeListResponse> {
    let client = Client::new();

    let mut url = format!(
        "{}/api/recipes?q={}",
        server_url,
        urlencoding::encode(query)
    );

    if let Some(difficulty) = difficulty {
        url.push_str(&format!("&difficulty={}", urlencoding::encode(&difficulty)));
    }

    if let Some(max_time) = max_time {
        url.push_str(&format!("&max_time={max_time}"));
    }

    if let Some(category) = category {
        url.push_str(&format!("&category={}", urlencoding::encode(&category)));
    }

    let response = client.get(&url).send().await?;

    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }

    let results: RecipeListResponse = response.json().await?;
    print_search_results(&results);

    Ok(results)
}

fn print_pantry_results(results: &PantrySearchResponse) {
    if results.matches.is_empty() {
        println!(
            "No matching recipes ({} checked)",
            results.total_recipes_checked
        );
        return;
    }

    println!(
        "\n{} matches from {} recipes:\n",
        results.matches.len(),
        results.total_recipes_checked
    );
    println!("{:<5} {:<40} {:>6}  Missing", "ID", "Title", "Match");
    println!("{}", "-".repeat(75));

    for m in &results.matches {
        println!(
            "{:<5} {:<40} {:>5}%  {}",
            m.id,
            truncate(&m.title, 40),
            m.match_percentage,
            m.missing_ingredients.join(", ")
        );
    }
}

fn print_search_results(results: &RecipeListResponse) {
    if results.recipes.is_empty() {
        println!("No recipes found");
        return;
    }

    println!("\nFound {} recipes:\n", results.recipes.len());
    println!("{:<5} {:<50} {:<10}", "ID", "Title", "Time");
    println!("{}", "-".repeat(67));

    for recipe in &results.recipes {
        let time = recipe
            .total_time
            .map(crate::utils::conversion::format_duration)
            .unwrap_or_default();
        println!("{:<5} {:<50} {:<10}", recipe.id, truncate(&recipe.title, 50), time);
    }
}
