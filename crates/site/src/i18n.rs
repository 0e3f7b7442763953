//! Interface strings and localized routes.
//!
//! French is served at the root, English under `/en`. Path segments are
//! translated too (`/recettes` and `/en/recipes`), so the language switcher
//! maps a path segment by segment.

use menucochon_core::Locale;

/// `(key, french, english)`.
const STRINGS: &[(&str, &str, &str)] = &[
    ("site.name", "Menucochon", "Menucochon"),
    ("site.tagline", "Recettes québécoises, simples et gourmandes", "Simple, hearty Quebec recipes"),
    ("nav.home", "Accueil", "Home"),
    ("nav.recipes", "Recettes", "Recipes"),
    ("nav.blog", "Blogue", "Blog"),
    ("nav.lexicon", "Lexique", "Lexicon"),
    ("nav.videos", "Vidéos", "Videos"),
    ("nav.shop", "Boutique", "Shop"),
    ("nav.switch", "English", "Français"),
    ("home.latest_recipes", "Dernières recettes", "Latest recipes"),
    ("home.latest_posts", "Du blogue", "From the blog"),
    ("home.categories", "Catégories", "Categories"),
    ("home.fridge", "Qu'y a-t-il dans votre frigo?", "What's in your fridge?"),
    ("home.fridge_hint", "tomates, oignon, ail", "tomatoes, onion, garlic"),
    ("recipes.title", "Toutes les recettes", "All recipes"),
    ("recipes.filter", "Filtrer", "Filter"),
    ("recipes.all_categories", "Toutes les catégories", "All categories"),
    ("recipes.any_difficulty", "Toutes difficultés", "Any difficulty"),
    ("recipes.max_time", "Temps max. (min)", "Max. time (min)"),
    ("recipes.search", "Rechercher", "Search"),
    ("recipes.none", "Aucune recette ne correspond.", "No recipe matches."),
    ("recipes.prep", "Préparation", "Prep"),
    ("recipes.cook", "Cuisson", "Cook"),
    ("recipes.total", "Total", "Total"),
    ("recipes.servings", "Portions", "Servings"),
    ("recipes.ingredients", "Ingrédients", "Ingredients"),
    ("recipes.steps", "Préparation", "Method"),
    ("recipes.related", "Vous aimerez aussi", "You might also like"),
    ("recipes.rate", "Notez cette recette", "Rate this recipe"),
    ("recipes.ratings", "évaluations", "ratings"),
    ("recipes.no_ratings", "Pas encore évaluée", "Not rated yet"),
    ("recipes.video", "En vidéo", "Watch"),
    ("difficulty.easy", "Facile", "Easy"),
    ("difficulty.medium", "Moyen", "Medium"),
    ("difficulty.hard", "Difficile", "Hard"),
    ("pagination.previous", "Précédent", "Previous"),
    ("pagination.next", "Suivant", "Next"),
    ("blog.title", "Blogue", "Blog"),
    ("blog.reading_time", "min de lecture", "min read"),
    ("blog.recent", "Articles récents", "Recent posts"),
    ("blog.by", "Par", "By"),
    ("lexicon.title", "Lexique culinaire", "Culinary lexicon"),
    ("lexicon.empty", "Aucun terme pour cette lettre.", "No term under this letter."),
    ("videos.title", "Vidéos", "Videos"),
    ("shop.title", "Boutique", "Shop"),
    ("shop.add", "Ajouter au panier", "Add to cart"),
    ("shop.checkout", "Passer à la caisse", "Checkout"),
    ("shop.out_of_stock", "Épuisé", "Sold out"),
    ("shop.quantity", "Quantité", "Quantity"),
    ("shop.cart", "Panier", "Cart"),
    ("shop.cancelled", "Paiement annulé. Votre panier est toujours là.", "Payment cancelled. Your cart is still here."),
    ("checkout.thanks", "Merci pour votre commande!", "Thank you for your order!"),
    ("checkout.thanks_body", "Un reçu vous sera envoyé par courriel.", "A receipt will be emailed to you."),
    ("newsletter.title", "Infolettre", "Newsletter"),
    ("newsletter.placeholder", "Votre courriel", "Your email"),
    ("newsletter.submit", "S'abonner", "Subscribe"),
    ("error.not_found", "Page introuvable", "Page not found"),
    ("error.not_found_body", "Cette page n'existe pas ou a été déplacée.", "This page does not exist or has moved."),
    ("error.back_home", "Retour à l'accueil", "Back to home"),
];

/// French and English path segments that translate into each other.
const SEGMENTS: &[(&str, &str)] = &[
    ("recettes", "recipes"),
    ("recette", "recipe"),
    ("categorie", "category"),
    ("blogue", "blog"),
    ("lexique", "lexicon"),
    ("boutique", "shop"),
    ("merci", "thank-you"),
    ("videos", "videos"),
];

/// Interface string for `key`; unknown keys render as the key itself.
#[must_use]
pub fn t(locale: Locale, key: &'static str) -> &'static str {
    STRINGS
        .iter()
        .find(|(k, _, _)| *k == key)
        .map_or(key, |(_, fr, en)| match locale {
            Locale::Fr => *fr,
            Locale::En => *en,
        })
}

fn segment(locale: Locale, fr: &'static str) -> &'static str {
    match locale {
        Locale::Fr => fr,
        Locale::En => SEGMENTS
            .iter()
            .find(|(f, _)| *f == fr)
            .map_or(fr, |(_, en)| *en),
    }
}

fn localized(locale: Locale, segments: &[&str]) -> String {
    let mut path = locale.path_prefix().to_string();
    for s in segments {
        path.push('/');
        path.push_str(s);
    }
    if path.is_empty() {
        path.push('/');
    }
    path
}

#[must_use]
pub fn home_path(locale: Locale) -> String {
    localized(locale, &[])
}

#[must_use]
pub fn recipes_path(locale: Locale) -> String {
    localized(locale, &[segment(locale, "recettes")])
}

#[must_use]
pub fn recipe_path(locale: Locale, slug: &str) -> String {
    localized(locale, &[segment(locale, "recette"), slug])
}

#[must_use]
pub fn category_path(locale: Locale, slug: &str) -> String {
    localized(
        locale,
        &[segment(locale, "recettes"), segment(locale, "categorie"), slug],
    )
}

#[must_use]
pub fn blog_path(locale: Locale) -> String {
    localized(locale, &[segment(locale, "blogue")])
}

#[must_use]
pub fn post_path(locale: Locale, slug: &str) -> String {
    localized(locale, &[segment(locale, "blogue"), slug])
}

#[must_use]
pub fn lexicon_path(locale: Locale) -> String {
    localized(locale, &[segment(locale, "lexique")])
}

#[must_use]
pub fn term_path(locale: Locale, slug: &str) -> String {
    localized(locale, &[segment(locale, "lexique"), slug])
}

#[must_use]
pub fn videos_path(locale: Locale) -> String {
    localized(locale, &[segment(locale, "videos")])
}

#[must_use]
pub fn shop_path(locale: Locale) -> String {
    localized(locale, &[segment(locale, "boutique")])
}

#[must_use]
pub fn product_path(locale: Locale, slug: &str) -> String {
    localized(locale, &[segment(locale, "boutique"), slug])
}

#[must_use]
pub fn checkout_success_path(locale: Locale) -> String {
    localized(locale, &[segment(locale, "boutique"), segment(locale, "merci")])
}

/// Locale a request path is served in.
#[must_use]
pub fn locale_of_path(path: &str) -> Locale {
    if path == "/en" || path.starts_with("/en/") {
        Locale::En
    } else {
        Locale::Fr
    }
}

/// The same page in another locale, for the language switcher and
/// `hreflang` links. Slugs and unknown segments are kept as they are.
#[must_use]
pub fn translate_path(path: &str, target: Locale) -> String {
    let source = locale_of_path(path);
    let rest = match source {
        Locale::En => path.strip_prefix("/en").unwrap_or(path),
        Locale::Fr => path,
    };

    let translated: Vec<&str> = rest
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| {
            SEGMENTS
                .iter()
                .find_map(|(fr, en)| match source {
                    Locale::Fr if *fr == s => Some(segment(target, *fr)),
                    Locale::En if *en == s => Some(segment(target, *fr)),
                    _ => None,
                })
                .unwrap_or(s)
        })
        .collect();

    localized(target, &translated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_t() {
        assert_eq!(t(Locale::Fr, "nav.recipes"), "Recettes");
        assert_eq!(t(Locale::En, "nav.recipes"), "Recipes");
        assert_eq!(t(Locale::En, "missing.key"), "missing.key");
    }

    #[test]
    fn test_paths() {
        assert_eq!(home_path(Locale::Fr), "/");
        assert_eq!(home_path(Locale::En), "/en");
        assert_eq!(recipe_path(Locale::Fr, "tourtiere"), "/recette/tourtiere");
        assert_eq!(recipe_path(Locale::En, "tourtiere"), "/en/recipe/tourtiere");
        assert_eq!(category_path(Locale::Fr, "desserts"), "/recettes/categorie/desserts");
        assert_eq!(category_path(Locale::En, "desserts"), "/en/recipes/category/desserts");
        assert_eq!(blog_path(Locale::Fr), "/blogue");
        assert_eq!(lexicon_path(Locale::En), "/en/lexicon");
        assert_eq!(shop_path(Locale::Fr), "/boutique");
        assert_eq!(checkout_success_path(Locale::En), "/en/shop/thank-you");
        assert_eq!(videos_path(Locale::En), "/en/videos");
    }

    #[test]
    fn test_translate_path() {
        assert_eq!(translate_path("/recette/pate-chinois", Locale::En), "/en/recipe/pate-chinois");
        assert_eq!(translate_path("/en/blog/my-post", Locale::Fr), "/blogue/my-post");
        assert_eq!(translate_path("/", Locale::En), "/en");
        assert_eq!(translate_path("/en", Locale::Fr), "/");
        assert_eq!(translate_path("/boutique", Locale::Fr), "/boutique");
        assert_eq!(
            translate_path("/en/recipes/category/soupes", Locale::Fr),
            "/recettes/categorie/soupes"
        );
    }

    #[test]
    fn test_locale_of_path() {
        assert_eq!(locale_of_path("/en/recipes"), Locale::En);
        assert_eq!(locale_of_path("/en"), Locale::En);
        assert_eq!(locale_of_path("/english-muffins"), Locale::Fr);
    }
}
