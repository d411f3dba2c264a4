//! The per-document landmark finder: scans, patches, and answers queries.

mod mutations;
pub mod views;

pub use self::views::{LandmarkElementInfo, LandmarkInfo, TreeEntry};

use crate::css::StyleSheet;
use crate::cursor::NavigationCursor;
use crate::error::Result;
use crate::landmark_tree::builder::LandmarkTreeBuilder;
use crate::landmark_tree::LandmarkTree;
use crate::lint::{lint, Warnings};
use crate::misc::print_tree::PrintTree;
use crate::options::ScanOptions;
use kuchiki::NodeRef;
use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

/// Finds the landmarks of one document and keeps them up to date.
///
/// Nothing is shared between instances; hosts observing several documents
/// create one finder for each.
pub struct LandmarksFinder {
    document: NodeRef,
    /// Options to use from the next scan on.
    options: ScanOptions,
    /// Options the current tree was built with.
    active: ScanOptions,
    styles: StyleSheet,
    tree: LandmarkTree,
    page_warnings: Warnings,
    cursor: NavigationCursor,
    scan_count: usize,
    tree_view: RefCell<Option<Rc<Vec<TreeEntry>>>>,
}

impl LandmarksFinder {
    /// Creates a finder for `document`. Doesn't scan until asked to.
    pub fn new(document: NodeRef, options: ScanOptions) -> Self {
        Self {
            document,
            options,
            active: options,
            styles: StyleSheet::user_agent(),
            tree: LandmarkTree::new(),
            page_warnings: Warnings::empty(),
            cursor: NavigationCursor::new(),
            scan_count: 0,
            tree_view: RefCell::new(None),
        }
    }

    pub fn document(&self) -> &NodeRef {
        &self.document
    }

    /// Throws away everything and scans the whole document.
    pub fn scan(&mut self) {
        self.reset();
        self.active = self.options;
        self.styles = StyleSheet::for_document(&self.document);

        let mut builder = LandmarkTreeBuilder::new(&self.document, &self.styles, &mut self.tree);
        builder.build();
        if self.active.heuristics {
            builder.reconcile_guesses();
        }

        if let Err(e) = self.tree.renumber() {
            // Can't happen on a tree built from scratch, but then there's
            // nothing better to fall back to either.
            error!("Fresh scan produced {}", e);
        }
        if self.active.developer_mode {
            self.page_warnings = lint(&mut self.tree);
        }

        self.scan_count += 1;
        debug!(
            "Scan #{} found {} landmarks ({:?})",
            self.scan_count,
            self.tree.len(),
            self.active
        );
    }

    /// Forgets all landmarks, e.g. when the page navigates away.
    pub fn reset(&mut self) {
        self.tree.clear();
        self.page_warnings = Warnings::empty();
        self.cursor.reset();
        self.invalidate_views();
    }

    fn invalidate_views(&self) {
        self.tree_view.borrow_mut().take();
    }

    /// How many full scans have run. Incremental updates don't count.
    pub fn scan_count(&self) -> usize {
        self.scan_count
    }

    pub fn number_of_landmarks(&self) -> usize {
        self.tree.len()
    }

    pub fn landmark_tree(&self) -> &LandmarkTree {
        &self.tree
    }

    pub fn flat_list(&self) -> Vec<LandmarkInfo> {
        self.tree
            .ids()
            .iter()
            .map(|&id| LandmarkInfo::new(&self.tree, id))
            .collect()
    }

    /// The nested view of the landmarks. Shared until the next change.
    pub fn tree(&self) -> Rc<Vec<TreeEntry>> {
        let mut view = self.tree_view.borrow_mut();
        view.get_or_insert_with(|| Rc::new(TreeEntry::build(&self.tree)))
            .clone()
    }

    pub fn tree_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&*self.tree())?)
    }

    pub fn next(&mut self, focused: Option<&NodeRef>) -> Option<LandmarkElementInfo> {
        let index = self.cursor.next(&self.tree, focused)?;
        LandmarkElementInfo::new(&self.tree, index)
    }

    pub fn previous(&mut self, focused: Option<&NodeRef>) -> Option<LandmarkElementInfo> {
        let index = self.cursor.previous(&self.tree, focused)?;
        LandmarkElementInfo::new(&self.tree, index)
    }

    pub fn jump_to(&mut self, index: usize) -> Option<LandmarkElementInfo> {
        let index = self.cursor.jump_to(&self.tree, index)?;
        LandmarkElementInfo::new(&self.tree, index)
    }

    pub fn cycle_main(&mut self) -> Option<LandmarkElementInfo> {
        let index = self.cursor.cycle_main(&self.tree)?;
        LandmarkElementInfo::new(&self.tree, index)
    }

    pub fn selected(&self) -> Option<usize> {
        self.cursor.selected()
    }

    /// Takes effect on the next scan.
    pub fn set_heuristics(&mut self, heuristics: bool) {
        self.options.heuristics = heuristics;
    }

    /// Takes effect on the next scan.
    pub fn set_developer_mode(&mut self, developer_mode: bool) {
        self.options.developer_mode = developer_mode;
    }

    pub fn options(&self) -> ScanOptions {
        self.options
    }

    /// Page-level lint warnings, only available in developer mode.
    pub fn page_warnings(&self) -> Option<Warnings> {
        if self.active.developer_mode {
            Some(self.page_warnings)
        } else {
            None
        }
    }

    /// Prints the landmark tree to stdout.
    pub fn print(&self) -> io::Result<()> {
        self.print_to(&mut io::stdout())
    }

    /// Prints the landmark tree to a particular output.
    pub fn print_to(&self, dest: &mut dyn Write) -> io::Result<()> {
        {
            let title = format!("Landmarks ({})", self.tree.len());
            let mut printer = PrintTree::new(&title, dest)?;
            self.tree.print(&mut printer)?;
        }
        if let Some(warnings) = self.page_warnings() {
            if !warnings.is_empty() {
                writeln!(dest, "Page warnings: {}", warnings.tags().collect::<Vec<_>>().join(", "))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_document;
    use crate::role::Role;

    const SCENARIO: &str = "<body><header><nav aria-label='Main nav'>links</nav></header><main>content</main></body>";

    fn finder(html: &str, options: ScanOptions) -> LandmarksFinder {
        let mut finder = LandmarksFinder::new(parse_document(html), options);
        finder.scan();
        finder
    }

    #[test]
    fn scenario() {
        let finder = finder(SCENARIO, ScanOptions::default());
        let list = finder.flat_list();
        let summary = list
            .iter()
            .map(|l| (l.depth, l.role, l.label.as_deref(), l.selector.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(
            summary,
            [
                (0, Role::Banner, None, "body > header"),
                (1, Role::Navigation, Some("Main nav"), "body > header > nav"),
                (0, Role::Main, None, "body > main"),
            ]
        );

        let tree = finder.tree();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].contains[0].role, Role::Navigation);
        assert!(Rc::ptr_eq(&tree, &finder.tree()));
        assert_eq!(finder.number_of_landmarks(), 3);
        assert_eq!(finder.page_warnings(), None);
    }

    #[test]
    fn scanning_is_idempotent() {
        let mut finder = finder(SCENARIO, ScanOptions { heuristics: true, developer_mode: true });
        let first = finder.flat_list();
        let first_tree = finder.tree();
        finder.scan();
        assert_eq!(finder.flat_list(), first);
        assert_eq!(*finder.tree(), *first_tree);
        assert_eq!(finder.scan_count(), 2);
    }

    #[test]
    fn options_apply_on_next_scan() {
        let html = "<body><div id=main>x</div><nav></nav><nav></nav></body>";
        let mut finder = finder(html, ScanOptions::default());
        assert_eq!(finder.number_of_landmarks(), 2);

        finder.set_heuristics(true);
        finder.set_developer_mode(true);
        assert_eq!(finder.number_of_landmarks(), 2);
        assert_eq!(finder.page_warnings(), None);

        finder.scan();
        assert_eq!(finder.number_of_landmarks(), 3);
        assert_eq!(finder.page_warnings(), Some(Warnings::NO_MAIN));
        let navs = finder.flat_list().into_iter().filter(|l| l.role == Role::Navigation).collect::<Vec<_>>();
        assert!(navs.iter().all(|l| l.warnings == Warnings::DUPLICATE_UNLABELLED));
    }

    #[test]
    fn json_projection() {
        let finder = finder("<body><aside aria-roledescription=sidebar><nav>x</nav></aside></body>", ScanOptions::default());
        assert_eq!(
            finder.tree_json().unwrap(),
            concat!(
                r#"[{"index":0,"role":"complementary","roleDescription":"sidebar","label":null,"#,
                r#""selector":"body > aside","guessed":false,"contains":["#,
                r#"{"index":1,"role":"navigation","roleDescription":null,"label":null,"#,
                r#""selector":"body > aside > nav","guessed":false,"contains":[]}]}]"#,
            )
        );
    }

    #[test]
    fn navigation_follows_focus() {
        let mut finder = finder(
            "<body><header>h</header><main><p id=inside>x</p><nav>n</nav><p id=after>y</p></main><footer>f</footer></body>",
            ScanOptions::default(),
        );
        let document = finder.document().clone();
        let inside = document.select_first("#inside").unwrap().as_node().clone();
        let after = document.select_first("#after").unwrap().as_node().clone();
        let body = document.select_first("body").unwrap().as_node().clone();

        // Focus inside main, before the nested nav.
        assert_eq!(finder.next(Some(&inside)).unwrap().role, Role::Navigation);
        assert_eq!(finder.previous(Some(&inside)).unwrap().role, Role::Banner);
        // After the nav, still inside main.
        assert_eq!(finder.next(Some(&after)).unwrap().role, Role::Contentinfo);
        assert_eq!(finder.previous(Some(&after)).unwrap().role, Role::Navigation);

        // Focus outside landmarks steps from the last selection.
        assert_eq!(finder.selected(), Some(2));
        assert_eq!(finder.next(Some(&body)).unwrap().index, 3);
        assert_eq!(finder.next(None).unwrap().index, 0);
        assert_eq!(finder.previous(None).unwrap().index, 3);

        let footer = finder.jump_to(3).unwrap().element;
        assert_eq!(finder.next(Some(&footer)).unwrap().index, 0);
        assert_eq!(finder.previous(Some(&footer)).unwrap().role, Role::Navigation);
        assert!(finder.jump_to(4).is_none());
    }

    #[test]
    fn cycling_mains() {
        let mut finder = finder(
            "<body><main>a</main><div role=main>b</div><nav>c</nav><main>d</main></body>",
            ScanOptions::default(),
        );
        let indices = (0..4).map(|_| finder.cycle_main().unwrap().index).collect::<Vec<_>>();
        assert_eq!(indices, [0, 1, 3, 0]);

        let mut empty = LandmarksFinder::new(parse_document("<p>x</p>"), ScanOptions::default());
        empty.scan();
        assert!(empty.cycle_main().is_none());
        assert!(empty.next(None).is_none());
    }

    #[test]
    fn prints_page_warnings() {
        let finder = finder(
            "<body><nav>a</nav><nav>b</nav></body>",
            ScanOptions { heuristics: false, developer_mode: true },
        );
        let mut out = Vec::new();
        finder.print_to(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Landmarks (2)\n\
             - navigation @ body > nav:nth-child(1) !lintDuplicateUnlabelled\n\
             - navigation @ body > nav:nth-child(2) !lintDuplicateUnlabelled\n\
             Page warnings: lintNoMain\n"
        );
    }
}
