//! Landmark roles and the classification of elements into them.

use crate::dom;
use kuchiki::NodeRef;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Banner,
    Complementary,
    Contentinfo,
    Form,
    Main,
    Navigation,
    Region,
    Search,
}

impl Role {
    pub const ALL: [Role; 8] = [
        Role::Banner,
        Role::Complementary,
        Role::Contentinfo,
        Role::Form,
        Role::Main,
        Role::Navigation,
        Role::Region,
        Role::Search,
    ];

    /// Parses a single role token, ignoring ASCII case.
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .cloned()
            .find(|role| role.as_str().eq_ignore_ascii_case(token))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Banner => "banner",
            Role::Complementary => "complementary",
            Role::Contentinfo => "contentinfo",
            Role::Form => "form",
            Role::Main => "main",
            Role::Navigation => "navigation",
            Role::Region => "region",
            Role::Search => "search",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Classification {
    pub role: Option<Role>,
    /// Whether the role came from the `role` attribute.
    pub explicit: bool,
}

impl Classification {
    const NONE: Self = Self { role: None, explicit: false };
}

/// Elements that scope `header` and `footer` to their own content, so those
/// don't map to `banner` / `contentinfo` when inside one.
const SECTIONING_ANCESTORS: &[&str] = &[
    "article",
    "aside",
    "main",
    "nav",
    "section",
    "blockquote",
    "details",
    "fieldset",
    "figure",
    "td",
    "th",
];

pub fn classify(element: &NodeRef) -> Classification {
    if let Some(roles) = dom::attribute(element, "role") {
        if let Some(role) = roles.split_whitespace().filter_map(Role::from_token).next() {
            return Classification { role: Some(role), explicit: true };
        }
    }

    let role = match dom::local_name(element) {
        Some("aside") => Role::Complementary,
        Some("form") => Role::Form,
        Some("main") => Role::Main,
        Some("nav") => Role::Navigation,
        Some("section") => Role::Region,
        Some("header") if !is_scoped(element) => Role::Banner,
        Some("footer") if !is_scoped(element) => Role::Contentinfo,
        _ => return Classification::NONE,
    };

    Classification { role: Some(role), explicit: false }
}

fn is_scoped(element: &NodeRef) -> bool {
    element.ancestors().any(|ancestor| {
        dom::local_name(&ancestor).map_or(false, |name| SECTIONING_ANCESTORS.contains(&name))
    })
}

/// Whether an element with this role and label counts as a landmark.
///
/// `region` always needs a label, and so does an implicit `form`. An explicit
/// `role="form"` is a landmark either way.
pub fn is_landmark(role: Role, explicit: bool, label: Option<&str>) -> bool {
    match role {
        Role::Region => label.is_some(),
        Role::Form => explicit || label.is_some(),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_document;

    fn classify_first(html: &str, selector: &str) -> Classification {
        let document = parse_document(html);
        let element = document.select_first(selector).unwrap().as_node().clone();
        classify(&element)
    }

    #[test]
    fn explicit_roles_take_the_first_landmark_token() {
        let c = classify_first("<div role='presentation NAVIGATION search'></div>", "div");
        assert_eq!(c, Classification { role: Some(Role::Navigation), explicit: true });

        let c = classify_first("<nav role='button'></nav>", "nav");
        assert_eq!(c, Classification { role: Some(Role::Navigation), explicit: false });

        let c = classify_first("<div role='  '></div>", "div");
        assert_eq!(c, Classification::NONE);
    }

    #[test]
    fn implicit_roles() {
        assert_eq!(classify_first("<aside></aside>", "aside").role, Some(Role::Complementary));
        assert_eq!(classify_first("<section></section>", "section").role, Some(Role::Region));
        assert_eq!(classify_first("<header></header>", "header").role, Some(Role::Banner));
        assert_eq!(classify_first("<footer></footer>", "footer").role, Some(Role::Contentinfo));
        assert_eq!(classify_first("<div></div>", "div").role, None);
    }

    #[test]
    fn scoped_header_and_footer() {
        let html = "<article><div><header></header></div></article>";
        assert_eq!(classify_first(html, "header").role, None);
        let html = "<table><tr><td><footer></footer></td></tr></table>";
        assert_eq!(classify_first(html, "footer").role, None);
        let html = "<table><tr><th><header></header></th></tr></table>";
        assert_eq!(classify_first(html, "header").role, None);
        let html = "<div><header role=banner></header></div><main><header role=banner></header></main>";
        assert_eq!(classify_first(html, "main header").role, Some(Role::Banner));
    }

    #[test]
    fn landmark_qualification() {
        assert!(!is_landmark(Role::Region, false, None));
        assert!(is_landmark(Role::Region, false, Some("x")));
        assert!(!is_landmark(Role::Region, true, None));
        assert!(is_landmark(Role::Form, true, None));
        assert!(!is_landmark(Role::Form, false, None));
        assert!(is_landmark(Role::Form, false, Some("x")));
        assert!(is_landmark(Role::Navigation, false, None));
    }

    #[test]
    fn tokens() {
        assert_eq!(Role::from_token("ContentInfo"), Some(Role::Contentinfo));
        assert_eq!(Role::from_token("landmark"), None);
        assert_eq!(Role::Complementary.to_string(), "complementary");
    }
}
