//! HTML rendering for scan results.

/// Render an ingredient list as an HTML fragment.
///
/// A bold "INGREDIENTS" label followed by a `<ul>` with one item per
/// ingredient, in input order. An empty list renders the label and an empty
/// `<ul>`. Ingredient text is not HTML-escaped: the tokens come out of our
/// own letters-and-word-count filter, and this prototype is not a security
/// boundary.
pub fn ingredients_page(ingredients: &[String]) -> String {
    let mut html = String::from("<b>INGREDIENTS</b><br>\n<ul>\n");
    for ingredient in ingredients {
        html.push_str("<li>");
        html.push_str(ingredient);
        html.push_str("</li>\n");
    }
    html.push_str("</ul>\n");
    html
}

/// Render a user-facing error page.
pub fn error_page(message: &str) -> String {
    format!("<b>ERROR</b><br>\n<p>{message}</p>\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_items_in_input_order() {
        let html = ingredients_page(&["sugar".to_string(), "salt".to_string()]);
        assert_eq!(
            html,
            "<b>INGREDIENTS</b><br>\n<ul>\n<li>sugar</li>\n<li>salt</li>\n</ul>\n"
        );
    }

    #[test]
    fn empty_list_renders_label_and_empty_list() {
        let html = ingredients_page(&[]);
        assert_eq!(html, "<b>INGREDIENTS</b><br>\n<ul>\n</ul>\n");
    }

    #[test]
    fn error_page_includes_message() {
        assert!(error_page("something went wrong").contains("something went wrong"));
    }
}
