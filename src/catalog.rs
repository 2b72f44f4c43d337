use chrono::Utc;

use crate::model::{CatalogEntry, new_id};
use crate::store::Store;

/// Built-in curated recipes: `(title, description, image path)`.
pub const SEED: &[(&str, &str, &str)] = &[
    (
        "Avocado Egg Salad",
        "Creamy avocado mixed with boiled eggs for a protein-rich salad.",
        "/images/avocado-egg-salad.jpg",
    ),
    (
        "Grilled Chicken Salad",
        "Tender grilled chicken served over leafy greens and avocado.",
        "/images/grilled-chicken-salad-recipe.jpg",
    ),
    (
        "Lentil Soup",
        "Hearty and fiber-rich soup made with red lentils and veggies.",
        "/images/lentil-soup-2.jpg",
    ),
    (
        "Oats Banana Pancakes",
        "Wholesome pancakes made with oats, bananas, and no sugar.",
        "/images/banana-oatmeal-pancakes.jpg",
    ),
    (
        "Chickpea Stir Fry",
        "Quick and healthy stir fry with chickpeas, bell peppers, and herbs.",
        "/images/checkpea-stir-fry.jpg",
    ),
    (
        "Avocado Toast",
        "Whole grain toast topped with smashed avocado and spices.",
        "/images/avocado-toast-11.jpg",
    ),
    (
        "Zucchini Noodles",
        "Low-carb zucchini noodles tossed with tomato basil sauce.",
        "/images/Asian-Zucchini-Noodles.jpg",
    ),
    (
        "Chilla with Coconut",
        "Savory gram flour pancake topped with fresh coconut.",
        "/images/chilla-with-coconut.jpg",
    ),
    (
        "Cauliflower Pizza Crust",
        "Healthy, low-carb pizza base made from cauliflower.",
        "/images/Cauliflower-Pizza-Crust-low-carb.webp",
    ),
    (
        "Paneer Lettuce Wraps",
        "Spiced paneer wrapped in crunchy lettuce leaves.",
        "/images/paneer-lettuce-wraps-low-carb.jpg",
    ),
    (
        "Grilled Tandoori Chicken Skewers",
        "Lean chicken marinated in tandoori spices, grilled to perfection for a high-protein meal.",
        "/images/grilled-tandoori-chicken-skewers.jpg",
    ),
    (
        "Chia Yogurt Parfait",
        "Layered Greek yogurt with chia seeds, berries, and nuts for a nutritious, fiber-rich breakfast.",
        "/images/chia-yogurt-parfait.jpg",
    ),
];

/// Inserts every seed entry whose title is not in the catalog yet; returns
/// how many were added.
pub async fn seed_catalog(store: &dyn Store) -> anyhow::Result<usize> {
    let existing = store.list_catalog().await?;
    let mut added = 0;
    for (title, description, image_url) in SEED {
        if existing
            .iter()
            .any(|entry| entry.title.eq_ignore_ascii_case(title))
        {
            continue;
        }
        let entry = CatalogEntry {
            id: new_id(),
            title: (*title).to_owned(),
            description: (*description).to_owned(),
            image_url: (*image_url).to_owned(),
            likes: 0,
            created_at: Utc::now(),
        };
        store.insert_catalog_entry(&entry).await?;
        added += 1;
    }
    tracing::info!(added, total = SEED.len(), "catalog seeded");
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LocalFsStore;

    #[tokio::test]
    async fn seeding_is_idempotent() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = LocalFsStore::new(dir.path());

        assert_eq!(seed_catalog(&store).await?, SEED.len());
        assert_eq!(seed_catalog(&store).await?, 0);
        assert_eq!(store.list_catalog().await?.len(), SEED.len());
        Ok(())
    }
}
