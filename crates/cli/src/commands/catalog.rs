//! Catalog inspection commands.
//!
//! # Environment Variables
//!
//! - `SUPABASE_URL` - Project URL
//! - `SUPABASE_ANON_KEY` - Anonymous API key

use shopfront_core::Item;
use shopfront_storefront::config::StorefrontConfig;
use shopfront_storefront::db::CatalogRepository;
use shopfront_storefront::supabase::SupabaseClient;

use super::CommandError;

/// Print every item in the hosted catalog, one per line.
///
/// # Errors
///
/// Returns an error if configuration is missing or the request fails.
#[allow(clippy::print_stdout)]
pub async fn list() -> Result<(), CommandError> {
    let config = StorefrontConfig::from_env()?;
    let client = SupabaseClient::new(&config.supabase)?;

    tracing::info!("Fetching catalog from {}", config.supabase.url);
    let items = CatalogRepository::new(&client).list().await?;

    for item in &items {
        println!("{}", format_row(item));
    }
    tracing::info!("{} item(s)", items.len());

    Ok(())
}

fn format_row(item: &Item) -> String {
    let sizes = item.sizes_label().unwrap_or("-");
    let image = item.image_url().unwrap_or("-");
    format!("{}\t{}\t{sizes}\t{image}", item.id, item.name)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_format_row() {
        let item: Item = serde_json::from_str(
            r#"{"id": 7, "name": "Saree", "description": "", "image": "", "sizes": null}"#,
        )
        .unwrap();
        assert_eq!(format_row(&item), "7\tSaree\t-\t-");
    }
}
