//! Goal-path heuristic for classifying a journey as converted.
//!
//! A journey counts as a conversion when its final page sits under one of
//! these product-area prefixes. The list is product-specific and matching
//! is a plain prefix test; pages outside the known areas are dropouts.

pub const GOAL_PATH_PREFIXES: [&str; 5] = [
    "/dashboard",
    "/tools",
    "/icp",
    "/personas",
    "/command-center",
];

pub fn is_goal_page(page: &str) -> bool {
    GOAL_PATH_PREFIXES
        .iter()
        .any(|prefix| page.starts_with(prefix))
}
