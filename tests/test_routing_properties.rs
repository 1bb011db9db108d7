//! Property tests for intent routing
//!
//! Generated messages check the routing invariants: link keywords always win
//! and yield `base_url + path`, black-and-white pricing shadows color
//! pricing, routing is pure, and unmatched messages reach the agent exactly once.

use papersprint_chat::chat::{ChatDispatcher, ChatRequest, ReplyOrigin};
use papersprint_chat::intent::{IntentRouter, LinkDirectory, RouteSource, PRICE_WORDS};
use papersprint_chat::testing::MockAgentGateway;
use proptest::prelude::*;
use std::sync::Arc;

const BASE: &str = "https://papersprint.example";

fn router() -> IntentRouter {
    IntentRouter::standard(BASE)
}

/// Lowercase filler that cannot spell any keyword: digits and spaces only
fn filler() -> impl Strategy<Value = String> {
    "[0-9 ]{0,12}"
}

fn randomize_case(text: &str, mask: &[bool]) -> String {
    text.chars()
        .zip(mask.iter().cycle())
        .map(|(c, upper)| {
            if *upper {
                c.to_ascii_uppercase()
            } else {
                c
            }
        })
        .collect()
}

/// Every storefront keyword and the page it must open
const EXPECTED_LINKS: &[(&str, &str)] = &[
    ("partner dashboard", "/partner/dashboard"),
    ("register partner", "/registerPartner"),
    ("partner", "/partner-with-us"),
    ("courier", "/courier-dashboard"),
    ("admin", "/admin-panel"),
    ("order dashboard", "/order-dashboard"),
    ("print section", "/print-section"),
    ("upload", "/print-section"),
    ("privacy", "/privacy-policy"),
    ("terms", "/terms-of-service"),
    ("contact", "/contact-us"),
    ("about us", "/about-us"),
    ("career", "/careers"),
    ("blog", "/blog"),
    ("profile", "/profile"),
    ("payment", "/payment"),
];

proptest! {
    #[test]
    fn link_keyword_yields_base_plus_path(
        (keyword, path) in prop::sample::select(EXPECTED_LINKS.to_vec()),
        prefix in filler(),
        suffix in filler(),
        mask in prop::collection::vec(any::<bool>(), 1..8),
    ) {
        let message = format!("{prefix}{}{suffix}", randomize_case(keyword, &mask));

        let reply = router().route(&message).expect("link keyword must route");

        prop_assert_eq!(reply, format!("{BASE}{path}"));
    }

    #[test]
    fn black_and_white_shadows_color(
        price_word in prop::sample::select(PRICE_WORDS.to_vec()),
        prefix in filler(),
        suffix in filler(),
        bw_first in any::<bool>(),
    ) {
        let body = if bw_first {
            "black and white or color"
        } else {
            "color or black and white"
        };
        let message = format!("{prefix}{price_word} {body}{suffix}");

        let reply = router().resolve(&message).expect("price question must route");
        prop_assert_eq!(reply.source, RouteSource::Rule { name: "black_and_white_price" });
    }

    #[test]
    fn color_price_when_black_and_white_absent(
        price_word in prop::sample::select(PRICE_WORDS.to_vec()),
        prefix in filler(),
        suffix in filler(),
    ) {
        let message = format!("{prefix}color {price_word}{suffix}");

        let reply = router().resolve(&message).expect("color price must route");
        prop_assert_eq!(reply.source, RouteSource::Rule { name: "color_price" });
    }

    #[test]
    fn routing_is_deterministic(message in ".{0,64}") {
        let router = router();
        prop_assert_eq!(router.route(&message), router.route(&message));
    }

    #[test]
    fn routing_ignores_case(message in "[a-zA-Z ]{0,48}") {
        let router = router();
        prop_assert_eq!(
            router.route(&message),
            router.route(&message.to_lowercase())
        );
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn unmatched_message_calls_agent_once(message in "[0-9]{1,16} [0-9]{1,16}") {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let (reply, calls) = runtime.block_on(async {
            let agent = Arc::new(MockAgentGateway::with_fragments(vec!["ok"]));
            let dispatcher = ChatDispatcher::new(Arc::new(router()), agent.clone());
            let reply = dispatcher.handle(ChatRequest::new(message.clone())).await.unwrap();
            (reply, agent.get_calls().await)
        });

        prop_assert_eq!(reply.origin, ReplyOrigin::Agent);
        prop_assert_eq!(calls, vec![message]);
    }
}

#[test]
fn test_expected_links_cover_the_directory() {
    let directory = LinkDirectory::standard();
    let keywords: Vec<&str> = directory
        .entries()
        .iter()
        .map(|entry| entry.keyword.as_str())
        .collect();
    let expected: Vec<&str> = EXPECTED_LINKS.iter().map(|(keyword, _)| *keyword).collect();

    assert_eq!(keywords, expected);
}

/// Several keywords in one message resolve by declaration order, not by
/// position in the message
#[test]
fn test_earlier_declared_keyword_wins() {
    let cases = [
        ("admin or partner", "/partner-with-us"),
        ("the blog about us", "/about-us"),
        ("payment on my profile", "/profile"),
        ("upload from the partner dashboard", "/partner/dashboard"),
        ("courier terms", "/courier-dashboard"),
    ];

    for (message, path) in cases {
        assert_eq!(
            router().route(message),
            Some(format!("{BASE}{path}")),
            "message: {message}"
        );
    }
}

/// Both pricing rules match "black and white and color price"; the
/// black-and-white rule is listed first and must keep winning
#[test]
fn test_black_and_white_precedence_is_intentional() {
    let reply = router()
        .resolve("black and white and color price")
        .unwrap();

    assert_eq!(
        reply.source,
        RouteSource::Rule {
            name: "black_and_white_price"
        }
    );
    assert!(reply.text.contains("₹2 per page"));
    assert!(!reply.text.contains("₹5"));
}
