// src/services/tickets.rs

//! Ticket-link extraction from post bodies.
//!
//! Scans an HTML fragment for anchor targets and classifies each against
//! the configured domain/keyword lists to find the single most plausible
//! external booking link. Link order in the document is the only relevance
//! signal: ticket links are assumed to appear early, so the first qualifying
//! link wins. No scoring and no multiple-candidate return.

use scraper::{Html, Selector};

use crate::models::TicketRules;

/// CSS selector for anchor elements. The literal is valid, so parsing
/// cannot fail.
fn anchor_selector() -> Selector {
    Selector::parse("a").expect("'a' is a valid selector")
}

/// Collect the `href` values of all anchor elements in document order.
///
/// Malformed markup is recovered best-effort by the HTML parser and never
/// raises. Anchors without an `href` attribute are skipped; duplicates are
/// kept. Other link-bearing elements (`<link>`, `<img>`, `<area>`) are out
/// of scope.
pub fn extract_links(html: &str) -> Vec<String> {
    let fragment = Html::parse_fragment(html);
    let selector = anchor_selector();

    fragment
        .select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .map(|href| href.to_string())
        .collect()
}

/// Classify a URL as an external ticket-booking link.
///
/// Applied in fixed precedence order against the lower-cased URL:
/// 1. self-referential links (publication domain + slug) are excluded
/// 2. social-platform links are excluded, even when a keyword also matches
/// 3. known ticketing-platform domains are included
/// 4. fallback keywords anywhere in the URL are included
///
/// The keyword fallback matches the entire URL string, not just path and
/// query. That is intentionally loose and a known source of false
/// positives.
pub fn is_ticket_link(rules: &TicketRules, url: &str) -> bool {
    let url_lower = url.to_lowercase();

    if url_lower.contains(&rules.self_domain) && url_lower.contains(&rules.self_slug) {
        return false;
    }

    if rules.social_domains.iter().any(|d| url_lower.contains(d)) {
        return false;
    }

    if rules
        .ticketing_domains
        .iter()
        .any(|d| url_lower.contains(d))
    {
        return true;
    }

    rules.keywords.iter().any(|k| url_lower.contains(k))
}

/// Return the first link in document order classified as a ticket link.
///
/// Deterministic: same HTML and rules always yield the same result.
pub fn extract_ticket_link(rules: &TicketRules, html: &str) -> Option<String> {
    extract_links(html)
        .into_iter()
        .find(|link| is_ticket_link(rules, link))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> TicketRules {
        TicketRules::default()
    }

    // --- extract_links ---

    #[test]
    fn no_anchors_yields_empty_sequence() {
        assert!(extract_links("").is_empty());
        assert!(extract_links("<p>Visit us soon</p>").is_empty());
        assert!(extract_links("<div><img src=\"x.png\"></div>").is_empty());
    }

    #[test]
    fn hrefs_collected_in_document_order_with_duplicates() {
        let html = r#"
            <p><a href="https://a.example/1">one</a></p>
            <a href="https://b.example/2">two</a>
            <a href="https://a.example/1">one again</a>
        "#;
        let links = extract_links(html);
        assert_eq!(
            links,
            vec![
                "https://a.example/1",
                "https://b.example/2",
                "https://a.example/1",
            ]
        );
    }

    #[test]
    fn anchors_without_href_are_skipped() {
        let html = r#"<a name="top">anchor</a><a href="https://x.example/">x</a>"#;
        assert_eq!(extract_links(html), vec!["https://x.example/"]);
    }

    #[test]
    fn malformed_markup_is_recovered() {
        let html = r#"<div><a href="https://x.example/ok">broken<p></a></div"#;
        assert_eq!(extract_links(html), vec!["https://x.example/ok"]);
    }

    #[test]
    fn non_anchor_link_elements_are_ignored() {
        let html = r#"
            <link href="https://cdn.example/style.css">
            <area href="https://map.example/region">
            <a href="https://x.example/only">x</a>
        "#;
        assert_eq!(extract_links(html), vec!["https://x.example/only"]);
    }

    // --- is_ticket_link ---

    #[test]
    fn self_referential_links_are_excluded() {
        assert!(!is_ticket_link(
            &rules(),
            "https://pintofviewclub.substack.com/p/some-other-post"
        ));
        // Even when the path carries a keyword
        assert!(!is_ticket_link(
            &rules(),
            "https://pintofviewclub.substack.com/p/book-club-tickets"
        ));
    }

    #[test]
    fn other_substack_publications_are_not_self_referential() {
        // Domain token alone is not enough; the slug must also appear.
        assert!(is_ticket_link(
            &rules(),
            "https://othernewsletter.substack.com/p/rsvp-here"
        ));
    }

    #[test]
    fn social_domains_are_excluded_before_keywords() {
        assert!(!is_ticket_link(
            &rules(),
            "https://facebook.com/events/tickets/123"
        ));
        assert!(!is_ticket_link(&rules(), "https://twitter.com/pintofview"));
        assert!(!is_ticket_link(
            &rules(),
            "https://www.instagram.com/p/register"
        ));
        assert!(!is_ticket_link(
            &rules(),
            "https://www.linkedin.com/company/booking"
        ));
    }

    #[test]
    fn known_ticketing_platforms_are_included() {
        assert!(is_ticket_link(&rules(), "https://www.eventbrite.com/e/abcd"));
        assert!(is_ticket_link(&rules(), "https://lu.ma/pint-night"));
        assert!(is_ticket_link(&rules(), "https://ra.co/events/1234"));
        assert!(is_ticket_link(&rules(), "https://pages.razorpay.com/pint"));
        assert!(is_ticket_link(
            &rules(),
            "https://in.bookmyshow.com/events/pov/ET001"
        ));
    }

    #[test]
    fn keyword_fallback_matches_the_whole_url() {
        assert!(is_ticket_link(
            &rules(),
            "https://example.org/please-register-now"
        ));
        // Keyword in the host part also matches; loose by design.
        assert!(is_ticket_link(&rules(), "https://bookings.example.org/"));
    }

    #[test]
    fn classification_is_case_insensitive() {
        assert!(is_ticket_link(&rules(), "HTTPS://WWW.EVENTBRITE.COM/E/ABCD"));
        assert!(!is_ticket_link(&rules(), "https://FACEBOOK.com/tickets"));
    }

    #[test]
    fn unrelated_urls_are_not_ticket_links() {
        assert!(!is_ticket_link(&rules(), "https://example.org/about"));
        assert!(!is_ticket_link(&rules(), "mailto:hello@example.org"));
    }

    // --- extract_ticket_link ---

    #[test]
    fn empty_html_yields_no_ticket_link() {
        assert_eq!(extract_ticket_link(&rules(), ""), None);
    }

    #[test]
    fn no_qualifying_link_yields_none() {
        let html = r#"<a href="https://example.org/about">About</a>"#;
        assert_eq!(extract_ticket_link(&rules(), html), None);
    }

    #[test]
    fn first_qualifying_link_wins_not_first_overall() {
        let html = concat!(
            "<p>Visit us</p>",
            r#"<a href="https://facebook.com/page">FB</a>"#,
            r#"<a href="https://www.bookmyshow.com/event/1">Tickets</a>"#,
        );
        assert_eq!(
            extract_ticket_link(&rules(), html),
            Some("https://www.bookmyshow.com/event/1".to_string())
        );
    }

    #[test]
    fn earlier_qualifying_link_beats_later_one() {
        let html = concat!(
            r#"<a href="https://lu.ma/first">first</a>"#,
            r#"<a href="https://www.eventbrite.com/e/second">second</a>"#,
        );
        assert_eq!(
            extract_ticket_link(&rules(), html),
            Some("https://lu.ma/first".to_string())
        );
    }
}
