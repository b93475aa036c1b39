use crate::types::WikiTree;
use crate::utils::{capitalize, display_name, escape_attr, escape_html};

/// Builds the sidebar navigation from a discovered WikiTree.
pub struct NavigationComponent;

impl NavigationComponent {
    pub fn new() -> Self {
        Self
    }

    /// Sidebar HTML: search box, home link, then one collapsible section
    /// per category. `current` is the selected FilePath, used to highlight
    /// the active entry and keep its category section open.
    pub fn build_sidebar_html(&self, tree: &WikiTree, current: &str) -> String {
        let mut html = String::new();
        html.push_str("<nav class=\"sidebar-nav\">");
        html.push_str("<div class=\"sidebar-title\">Wiki Navigation</div>");
        html.push_str(
            "<form class=\"search-form\" action=\"/search\" method=\"get\">\
             <input type=\"search\" name=\"q\" placeholder=\"Search wiki\"></form>",
        );
        html.push_str("<ul class=\"nav-list\"><li>");
        html.push_str(&nav_link("index.md", "Home", current == "index.md"));
        html.push_str("</li></ul>");

        for (name, category) in &tree.categories {
            let prefix = format!("categories/{}", name);
            let open = current == category.path || current.starts_with(&format!("{}/", prefix));

            html.push_str("<details class=\"nav-category\"");
            if open {
                html.push_str(" open");
            }
            html.push('>');
            html.push_str(&format!(
                "<summary>{}</summary>",
                escape_html(&capitalize(name))
            ));
            html.push_str("<ul class=\"nav-list\">");
            html.push_str("<li>");
            html.push_str(&nav_link(&category.path, "Overview", current == category.path));
            html.push_str("</li>");

            for (stem, path) in &category.files {
                html.push_str("<li>");
                html.push_str(&nav_link(path, &display_name(stem), current == path.as_str()));
                html.push_str("</li>");
            }

            if category.files.is_empty() && category.subcategories.is_empty() {
                html.push_str("<li class=\"nav-empty\">No pages in this category</li>");
            }

            for (sub_name, sub) in &category.subcategories {
                html.push_str(&format!(
                    "<li class=\"nav-subcategory\">{}</li>",
                    escape_html(&display_name(sub_name))
                ));
                if let Some(index) = &sub.index {
                    let label = format!("{} Index", display_name(sub_name));
                    html.push_str("<li class=\"nav-sub-item\">");
                    html.push_str(&nav_link(index, &label, current == index.as_str()));
                    html.push_str("</li>");
                }
                for (stem, path) in &sub.files {
                    html.push_str("<li class=\"nav-sub-item\">");
                    html.push_str(&nav_link(path, &display_name(stem), current == path.as_str()));
                    html.push_str("</li>");
                }
            }

            html.push_str("</ul></details>");
        }

        html.push_str("</nav>");
        html
    }

    /// Sidebar with an "On this page" TOC section appended
    pub fn build_sidebar_with_toc(&self, tree: &WikiTree, current: &str, toc: &str) -> String {
        let mut html = self.build_sidebar_html(tree, current);
        if !toc.is_empty() {
            // Splice the TOC in before the closing nav tag
            html.truncate(html.len() - "</nav>".len());
            html.push_str("<div class=\"sidebar-toc\">");
            html.push_str("<div class=\"sidebar-toc-title\">On this page</div>");
            html.push_str(toc);
            html.push_str("</div></nav>");
        }
        html
    }
}

impl Default for NavigationComponent {
    fn default() -> Self {
        Self::new()
    }
}

fn nav_link(path: &str, label: &str, active: bool) -> String {
    let class = if active { " class=\"active\"" } else { "" };
    format!(
        "<a{} href=\"?file={}\">{}</a>",
        class,
        escape_attr(path),
        escape_html(label)
    )
}
