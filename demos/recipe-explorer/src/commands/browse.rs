use colored::Colorize;
use mise::mise_data::{Difficulty, GatewayMode, Recipe};
use mise::mise_store::FilterUpdate;
use mise::{AppError, MiseApp};

type CliResult = Result<(), AppError>;

pub struct SearchArgs {
    pub cuisine: Vec<String>,
    pub difficulty: Vec<Difficulty>,
    pub max_cook_time: Option<u32>,
    pub dietary: Vec<String>,
}

pub async fn list(app: &MiseApp, page: u32) -> CliResult {
    banner(app);
    let result = app.recipes().fetch_recipes(page).await;
    print_recipes(&result.items);
    println!(
        "{}",
        format!(
            "page {} · {} of {} recipes{}",
            result.page,
            result.items.len(),
            result.total,
            if result.has_more { " · more available" } else { "" }
        )
        .dimmed()
    );
    Ok(())
}

pub async fn featured(app: &MiseApp) -> CliResult {
    banner(app);
    print_recipes(&app.recipes().fetch_featured_recipes().await);
    Ok(())
}

pub async fn search(app: &MiseApp, query: &str, args: SearchArgs) -> CliResult {
    banner(app);
    let store = app.recipes();
    store
        .set_filters(FilterUpdate {
            cuisine: Some(args.cuisine),
            difficulty: Some(args.difficulty),
            max_cook_time: args.max_cook_time,
            dietary: Some(args.dietary),
        })
        .await;
    let hits = store.search_recipes(query).await;
    if hits.is_empty() {
        println!("{} No recipes match '{}'", "!".yellow(), query);
    } else {
        print_recipes(&hits);
    }
    Ok(())
}

pub async fn show(app: &MiseApp, id: &str) -> CliResult {
    banner(app);
    let recipe = app.recipes().fetch_recipe(id).await?;
    println!("{}", recipe.title.bold());
    if !recipe.description.is_empty() {
        println!("{}", recipe.description);
    }
    println!(
        "{} · prep {} min · cook {} min · rating {:.1} ({} reviews)",
        recipe.difficulty, recipe.prep_time, recipe.cook_time, recipe.rating, recipe.review_count
    );
    if !recipe.tags.is_empty() {
        println!("{}", recipe.tags.join(", ").cyan());
    }
    if !recipe.ingredients.is_empty() {
        println!("\n{}", "Ingredients".bold());
        for ingredient in &recipe.ingredients {
            println!("  - {} {} {}", ingredient.quantity, ingredient.unit, ingredient.name);
        }
    }
    if !recipe.steps.is_empty() {
        println!("\n{}", "Steps".bold());
        for (n, step) in recipe.steps.iter().enumerate() {
            println!("  {}. {}", n + 1, step.description);
        }
    }
    Ok(())
}

fn banner(app: &MiseApp) {
    if app.mode() == GatewayMode::Offline {
        println!(
            "{} backend not configured, showing sample recipes",
            "!".yellow()
        );
    }
}

fn print_recipes(recipes: &[Recipe]) {
    for recipe in recipes {
        println!(
            "{:>4}  {:<45} {:<6} {:>4} min  {}",
            recipe.id.dimmed(),
            recipe.title,
            recipe.difficulty.to_string(),
            recipe.total_time(),
            format!("★ {:.1}", recipe.rating).yellow()
        );
    }
}
