//! Page templates, compiled once at startup.

use minijinja::{context, Environment};

use crate::pages::store::Page;

const VIEW: &str = include_str!("../../templates/view.html");
const EDIT: &str = include_str!("../../templates/edit.html");

/// Which page template to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageTemplate {
    View,
    Edit,
}

impl PageTemplate {
    fn name(self) -> &'static str {
        match self {
            Self::View => "view.html",
            Self::Edit => "edit.html",
        }
    }
}

/// The compiled template set. Read-only after construction.
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    /// Compile the built-in templates.
    pub fn load() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template(PageTemplate::View.name(), VIEW)?;
        env.add_template(PageTemplate::Edit.name(), EDIT)?;
        Ok(Self { env })
    }

    /// Render `page` through `template`. HTML in the page is escaped.
    pub fn render(&self, template: PageTemplate, page: &Page) -> Result<String, minijinja::Error> {
        self.env
            .get_template(template.name())?
            .render(context! { title => page.title, body => page.body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_escapes_body() {
        let templates = Templates::load().unwrap();
        let html = templates
            .render(PageTemplate::View, &Page::new("Home", "<script>x</script>"))
            .unwrap();

        assert!(html.contains("<h1>Home</h1>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn edit_posts_to_save_route() {
        let templates = Templates::load().unwrap();
        let html = templates.render(PageTemplate::Edit, &Page::empty("Draft")).unwrap();

        assert!(html.contains("action=\"/save/Draft\""));
        assert!(html.contains("Editing Draft"));
    }
}
