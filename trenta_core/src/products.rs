//! Built-in food product table and product search.

use crate::{FoodCategory, FoodProduct, FoodUnit};
use once_cell::sync::Lazy;

/// Cached built-in products - built once and reused across all operations
static DEFAULT_PRODUCTS: Lazy<Vec<FoodProduct>> = Lazy::new(build_default_products);

/// Get a reference to the cached built-in product table
pub fn default_products() -> &'static [FoodProduct] {
    &DEFAULT_PRODUCTS
}

fn product(
    id: &str,
    name: &str,
    calories: i32,
    protein: f64,
    carbs: f64,
    fat: f64,
    category: FoodCategory,
    unit: FoodUnit,
    default_amount: f64,
) -> FoodProduct {
    FoodProduct {
        id: id.into(),
        name: name.into(),
        calories,
        protein,
        carbs,
        fat,
        fiber: None,
        sugar: None,
        category,
        unit,
        default_amount,
    }
}

/// Macros are per `default_amount` of the product's unit (usually 100 g)
fn build_default_products() -> Vec<FoodProduct> {
    use FoodCategory::*;
    use FoodUnit::*;
    vec![
        product("p1", "Chicken Breast", 165, 31.0, 0.0, 3.6, Meat, G, 100.0),
        product("p2", "Beef", 250, 26.0, 0.0, 15.0, Meat, G, 100.0),
        product("p3", "Salmon", 208, 20.0, 0.0, 13.0, Meat, G, 100.0),
        product("p4", "Egg", 78, 6.3, 0.6, 5.3, Meat, Piece, 1.0),
        product("p5", "Cottage Cheese", 98, 11.0, 3.4, 4.3, Dairy, G, 100.0),
        product("p6", "Greek Yogurt", 59, 10.0, 3.6, 0.4, Dairy, G, 100.0),
        product("p7", "Milk", 42, 3.4, 5.0, 1.0, Dairy, Ml, 100.0),
        product("p8", "Cheese", 402, 25.0, 1.3, 33.0, Dairy, G, 100.0),
        product("p9", "Rice", 130, 2.7, 28.0, 0.3, Grain, G, 100.0),
        product("p10", "Buckwheat", 110, 4.0, 21.3, 1.1, Grain, G, 100.0),
        product("p11", "Oatmeal", 68, 2.4, 12.0, 1.4, Grain, G, 100.0),
        product("p12", "Pasta", 131, 5.0, 25.0, 1.1, Grain, G, 100.0),
        product("p13", "Bread", 265, 9.0, 49.0, 3.2, Grain, G, 100.0),
        product("p14", "Apple", 52, 0.3, 14.0, 0.2, Fruit, G, 100.0),
        product("p15", "Banana", 89, 1.1, 23.0, 0.3, Fruit, G, 100.0),
        product("p16", "Orange", 47, 0.9, 12.0, 0.1, Fruit, G, 100.0),
        product("p17", "Tomato", 18, 0.9, 3.9, 0.2, Vegetable, G, 100.0),
        product("p18", "Cucumber", 15, 0.7, 3.6, 0.1, Vegetable, G, 100.0),
        product("p19", "Broccoli", 34, 2.8, 7.0, 0.4, Vegetable, G, 100.0),
        product("p20", "Potato", 77, 2.0, 17.0, 0.1, Vegetable, G, 100.0),
        product("p21", "Avocado", 160, 2.0, 8.5, 14.7, Fruit, G, 100.0),
        product("p22", "Walnuts", 654, 15.2, 13.7, 65.2, Snack, G, 100.0),
        product("p23", "Dark Chocolate", 546, 4.9, 61.0, 31.0, Snack, G, 100.0),
        product("p24", "Orange Juice", 45, 0.7, 10.4, 0.2, Drink, Ml, 100.0),
    ]
}

/// Case-insensitive substring search over name and category. An empty or
/// whitespace query returns everything.
pub fn search_products<'a>(products: &'a [FoodProduct], query: &str) -> Vec<&'a FoodProduct> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return products.iter().collect();
    }
    products
        .iter()
        .filter(|p| {
            p.name.to_lowercase().contains(&query) || p.category.label().contains(&query)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_ids_unique() {
        let products = default_products();
        let mut ids: Vec<_> = products.iter().map(|p| p.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), products.len());
    }

    #[test]
    fn test_search_by_name_case_insensitive() {
        let hits = search_products(default_products(), "chicken");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Chicken Breast");

        let hits = search_products(default_products(), "CHEESE");
        assert!(hits.iter().any(|p| p.name == "Cheese"));
        assert!(hits.iter().any(|p| p.name == "Cottage Cheese"));
    }

    #[test]
    fn test_search_by_category() {
        let hits = search_products(default_products(), "dairy");
        assert!(hits.len() >= 4);
        assert!(hits.iter().all(|p| p.category == FoodCategory::Dairy));
    }

    #[test]
    fn test_empty_query_returns_all() {
        assert_eq!(
            search_products(default_products(), "  ").len(),
            default_products().len()
        );
    }
}
