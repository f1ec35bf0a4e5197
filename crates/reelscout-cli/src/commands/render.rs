use crate::output::Output;
use comfy_table::{Attribute, Cell, Color, Table};
use owo_colors::OwoColorize;
use reelscout_core::{FeedMode, FeedView};
use reelscout_models::{Genre, MediaDetails, MediaItem};
use serde_json::json;

const OVERVIEW_WIDTH: usize = 60;

fn styled(table: &mut Table) {
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
}

fn header(title: &str) -> Cell {
    Cell::new(title).fg(Color::Cyan).add_attribute(Attribute::Bold)
}

/// Cut `text` to at most `max` characters, marking the cut with an ellipsis.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", kept.trim_end())
}

fn year_label(item: &MediaItem) -> String {
    item.release_year()
        .map(|y| y.to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn rating_label(rating: f32) -> String {
    if rating > 0.0 {
        format!("{:.1}", rating)
    } else {
        "N/A".to_string()
    }
}

/// Numbered list of titles; `offset` is the number of the first row minus one.
pub fn media_table(items: &[MediaItem], offset: usize) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header("#"),
        header("ID"),
        header("Title"),
        header("Year"),
        header("Rating"),
        header("Overview"),
    ]);
    for (n, item) in items.iter().enumerate() {
        table.add_row(vec![
            Cell::new(offset + n + 1),
            Cell::new(item.id),
            Cell::new(&item.title),
            Cell::new(year_label(item)),
            Cell::new(rating_label(item.rating)),
            Cell::new(truncate(&item.overview, OVERVIEW_WIDTH)),
        ]);
    }
    styled(&mut table);
    table
}

pub fn feed_json(view: &FeedView) -> serde_json::Value {
    json!({
        "type": "feed",
        "heading": view.heading(),
        "kind": view.kind.api_segment(),
        "mode": match view.mode {
            FeedMode::Browse => "browse",
            FeedMode::Search => "search",
        },
        "page": view.page,
        "has_more": view.has_more,
        "filters": {
            "genre": view.filters.genre,
            "year": view.filters.year,
            "min_rating": view.filters.min_rating,
            "sort": view.filters.sort.api_key(view.kind),
        },
        "error": view.error.as_ref().map(|e| e.to_string()),
        "items": serde_json::to_value(&view.items).unwrap_or_default(),
    })
}

pub fn render_feed(view: &FeedView, output: &Output) {
    if !output.is_human() {
        output.json(&feed_json(view));
        return;
    }

    output.println(format!("\n{}", view.heading().bright_cyan().bold()));
    if !view.filters.is_default() && view.mode == FeedMode::Browse {
        output.println(filter_summary(view).bright_black().to_string());
    }

    if let Some(error) = &view.error {
        output.error(format!("Failed to load: {}", error));
    }

    if view.items.is_empty() {
        if view.loading {
            output.println("Loading...".bright_black().to_string());
        } else if view.error.is_none() {
            output.println("No results.".bright_black().to_string());
        }
        return;
    }

    output.println(media_table(&view.items, 0).to_string());
    if view.loading {
        output.println("Loading more...".bright_black().to_string());
    } else if view.has_more {
        output.println(format!("Page {} loaded, more available", view.page).bright_black().to_string());
    }
}

fn filter_summary(view: &FeedView) -> String {
    let mut parts = Vec::new();
    if let Some(genre) = view.filters.genre {
        parts.push(format!("genre {}", genre));
    }
    if let Some(year) = view.filters.year {
        parts.push(format!("year {}", year));
    }
    if let Some(rating) = view.filters.min_rating {
        parts.push(format!("rating >= {}", rating));
    }
    parts.push(format!("sorted by {}", view.filters.sort.api_key(view.kind)));
    format!("Filters: {}", parts.join(", "))
}

pub fn render_suggestions(items: &[MediaItem], output: &Output) {
    if !output.is_human() {
        output.json(&json!({
            "type": "suggestions",
            "items": serde_json::to_value(items).unwrap_or_default(),
        }));
        return;
    }

    if items.is_empty() {
        output.println("No suggestions.".bright_black().to_string());
        return;
    }
    for (n, item) in items.iter().enumerate() {
        output.println(format!(
            "  {} {} {}",
            format!("{:>2}.", n + 1).bright_black(),
            item.title,
            format!("({})", year_label(item)).bright_black()
        ));
    }
}

pub fn render_genres(genres: &[Genre], output: &Output) {
    if !output.is_human() {
        output.json(&json!({
            "type": "genres",
            "genres": serde_json::to_value(genres).unwrap_or_default(),
        }));
        return;
    }

    let mut table = Table::new();
    table.set_header(vec![header("ID"), header("Genre")]);
    for genre in genres {
        table.add_row(vec![Cell::new(genre.id), Cell::new(&genre.name)]);
    }
    styled(&mut table);
    output.println(table.to_string());
}

fn money_label(amount: Option<u64>) -> Option<String> {
    let amount = amount.filter(|a| *a > 0)?;
    let digits = amount.to_string();
    let mut grouped = String::new();
    for (n, ch) in digits.chars().enumerate() {
        if n > 0 && (digits.len() - n) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    Some(format!("${}", grouped))
}

pub fn details_json(details: &MediaDetails, poster_url: Option<&str>) -> serde_json::Value {
    let mut value = serde_json::to_value(details).unwrap_or_default();
    if let Some(obj) = value.as_object_mut() {
        obj.insert("poster_url".to_string(), json!(poster_url));
        obj.insert("director".to_string(), json!(details.director()));
        obj.insert("trailer_url".to_string(), json!(details.trailer_url()));
        obj.insert("imdb_url".to_string(), json!(details.imdb_url()));
        obj.insert("runtime_label".to_string(), json!(details.runtime_label()));
    }
    value
}

pub fn render_details(details: &MediaDetails, poster_url: Option<&str>, output: &Output) {
    if !output.is_human() {
        output.json(&details_json(details, poster_url));
        return;
    }

    let year = details
        .release_date
        .map(|d| format!(" ({})", d.format("%Y")))
        .unwrap_or_default();
    output.println(format!("\n{}{}", details.title.bright_cyan().bold(), year));
    if let Some(tagline) = details.tagline.as_deref().filter(|t| !t.is_empty()) {
        output.println(tagline.italic().to_string());
    }

    let mut table = Table::new();
    table.set_header(vec![header(details.kind.plural_label()), Cell::new("")]);
    let mut row = |label: &str, value: String| {
        table.add_row(vec![Cell::new(label).add_attribute(Attribute::Bold), Cell::new(value)]);
    };
    row(
        "Rating",
        match details.rating {
            Some(r) => format!("{:.1}/10 ({} votes)", r, details.vote_count),
            None => "N/A".to_string(),
        },
    );
    row("Runtime", details.runtime_label());
    row("Genres", details.genre_names());
    if let Some(director) = details.director() {
        row("Director", director.to_string());
    }
    let cast = details.top_cast(5);
    if !cast.is_empty() {
        row("Cast", cast.join(", "));
    }
    if let Some(budget) = money_label(details.budget) {
        row("Budget", budget);
    }
    if let Some(revenue) = money_label(details.revenue) {
        row("Revenue", revenue);
    }
    if let Some(url) = poster_url {
        row("Poster", url.to_string());
    }
    if let Some(url) = details.trailer_url() {
        row("Trailer", url);
    }
    if let Some(url) = details.imdb_url() {
        row("IMDb", url);
    }
    if let Some(url) = details.homepage.as_deref().filter(|h| !h.is_empty()) {
        row("Homepage", url.to_string());
    }
    styled(&mut table);
    output.println(table.to_string());

    if !details.overview.is_empty() {
        output.println(format!("\n{}\n{}", "Overview".bold(), details.overview));
    }

    if !details.reviews.is_empty() {
        output.println(format!("\n{}", "Reviews".bold()));
        for review in details.reviews.iter().take(3) {
            output.println(format!(
                "  {} {}",
                format!("{}:", review.author).yellow(),
                truncate(&review.content, 200)
            ));
        }
    }

    if !details.similar.is_empty() {
        output.println(format!("\n{}", "Similar".bold()));
        let similar: Vec<MediaItem> = details.similar.iter().take(5).cloned().collect();
        output.println(media_table(&similar, 0).to_string());
    }
}
