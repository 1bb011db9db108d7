//! Ordered rule catalog for deterministic answers
//!
//! Rules are plain predicate/responder function pairs. The catalog is scanned
//! front to back and the first predicate that holds produces the answer, so the
//! order of [`RuleCatalog::standard`] is part of the public behavior.

/// Words that mark a pricing question.
pub const PRICE_WORDS: &[&str] = &["price", "cost", "rate"];

/// Words that ask for the site map.
pub const LISTING_WORDS: &[&str] = &["routes", "pages", "urls"];

/// Every public storefront page, as relative paths.
pub const ROUTE_LISTING: &str = "Here are the pages you can visit on PaperSprint:\n\
/ - Home\n\
/print-section - Upload and print your documents\n\
/cart - Your cart\n\
/payment - Payment\n\
/order-dashboard - Track your orders\n\
/profile - Your profile\n\
/partner-with-us - Partner with us\n\
/registerPartner - Partner registration\n\
/partner/dashboard - Partner dashboard\n\
/courier-dashboard - Courier dashboard\n\
/admin-panel - Admin panel\n\
/about-us - About us\n\
/contact-us - Contact us\n\
/careers - Careers\n\
/blog - Blog\n\
/privacy-policy - Privacy policy\n\
/terms-of-service - Terms of service";

/// Decides whether a rule applies to a lowercased message
pub type Predicate = fn(&str) -> bool;

/// Renders a rule's answer given the storefront base URL
pub type Responder = fn(&str) -> String;

/// A named deterministic rule
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub predicate: Predicate,
    pub responder: Responder,
}

impl Rule {
    pub const fn new(name: &'static str, predicate: Predicate, responder: Responder) -> Self {
        Self {
            name,
            predicate,
            responder,
        }
    }

    pub fn matches(&self, lowered: &str) -> bool {
        (self.predicate)(lowered)
    }

    pub fn respond(&self, base_url: &str) -> String {
        (self.responder)(base_url)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}

/// Immutable, ordered collection of rules
#[derive(Debug, Clone)]
pub struct RuleCatalog {
    rules: Vec<Rule>,
}

impl RuleCatalog {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// The storefront's built-in rules, in evaluation order
    pub fn standard() -> Self {
        Self::new(vec![
            Rule::new("route_listing", asks_for_listing, route_listing),
            Rule::new("black_and_white_price", asks_black_and_white_price, black_and_white_price),
            Rule::new("color_price", asks_color_price, color_price),
            Rule::new("general_price", mentions_price, general_price),
            Rule::new("login_help", asks_login, login_help),
            Rule::new("cart_help", asks_cart, cart_help),
            Rule::new("order_status", asks_order_status, order_status),
        ])
    }

    /// First rule whose predicate holds for the lowercased message
    pub fn first_match(&self, lowered: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.matches(lowered))
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn contains_any(lowered: &str, words: &[&str]) -> bool {
    words.iter().any(|word| lowered.contains(word))
}

fn mentions_price(lowered: &str) -> bool {
    contains_any(lowered, PRICE_WORDS)
}

fn asks_for_listing(lowered: &str) -> bool {
    contains_any(lowered, LISTING_WORDS)
}

fn asks_black_and_white_price(lowered: &str) -> bool {
    lowered.contains("black and white") && mentions_price(lowered)
}

fn asks_color_price(lowered: &str) -> bool {
    contains_any(lowered, &["color", "colour"]) && mentions_price(lowered)
}

fn asks_login(lowered: &str) -> bool {
    contains_any(lowered, &["login", "sign in"])
}

fn asks_cart(lowered: &str) -> bool {
    contains_any(lowered, &["cart", "checkout"])
}

fn asks_order_status(lowered: &str) -> bool {
    lowered.contains("order") && contains_any(lowered, &["status", "track"])
}

fn route_listing(_base_url: &str) -> String {
    ROUTE_LISTING.to_string()
}

fn black_and_white_price(base_url: &str) -> String {
    format!(
        "Black and white printing costs ₹2 per page. \
         Upload your document at {base_url}/print-section to place an order."
    )
}

fn color_price(base_url: &str) -> String {
    format!(
        "Color printing costs ₹5 per page. \
         Upload your document at {base_url}/print-section to place an order."
    )
}

fn general_price(base_url: &str) -> String {
    format!(
        "Our printing rates are ₹2 per page for black and white and ₹5 per page for color. \
         You can see the total for your documents at {base_url}/print-section."
    )
}

fn login_help(base_url: &str) -> String {
    format!(
        "Use the Login button in the top navigation bar to sign in with your email and password. \
         Once you are logged in you can upload documents at {base_url}/print-section."
    )
}

fn cart_help(base_url: &str) -> String {
    format!(
        "Your cart lists every document you have submitted for printing. \
         Review it and check out at {base_url}/cart."
    )
}

fn order_status(base_url: &str) -> String {
    format!(
        "You can track the status of your orders from your dashboard at {base_url}/order-dashboard."
    )
}
