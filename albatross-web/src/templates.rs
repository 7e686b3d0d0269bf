//! Server-side rendered pages
//!
//! Templates live in `templates/` and are compiled in by Askama.

use albatross_core::{LoginForm, PASSWORD_FIELD, USERNAME_FIELD};
use askama::Template;

/// Login page
#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub page_title: String,
    pub body_class: String,
    pub action: String,
    pub next: String,
    pub username: String,
    pub remember_me: bool,
    pub username_errors: Vec<String>,
    pub password_errors: Vec<String>,
}

impl LoginTemplate {
    pub fn from_form(form: &LoginForm, action: &str) -> Self {
        let messages = |field: &str| {
            form.errors_for(field)
                .iter()
                .map(|e| e.message.clone())
                .collect::<Vec<_>>()
        };

        Self {
            page_title: "Login".to_string(),
            body_class: "hold-transition login-page".to_string(),
            action: action.to_string(),
            next: form.next.clone().unwrap_or_default(),
            username: form.username.clone(),
            remember_me: form.remember_me,
            username_errors: messages(USERNAME_FIELD),
            password_errors: messages(PASSWORD_FIELD),
        }
    }
}

/// Dashboard index page
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub page_title: String,
    pub body_class: String,
    pub username: String,
    pub logout_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use albatross_core::{AlbatrossError, FieldError};

    #[test]
    fn test_login_template_renders_errors_and_next() {
        let mut form = LoginForm::blank(Some("/reports?x=1".to_string()));
        form.username = "alice".to_string();
        form.add_error(USERNAME_FIELD, FieldError::from(&AlbatrossError::authentication()));

        let html = LoginTemplate::from_form(&form, "/login/").render().unwrap();
        assert!(html.contains(r#"name="next" value="/reports?x=1""#));
        assert!(html.contains(r#"value="alice""#));
        assert!(html.contains(r#"data-field="username">Authentication Error"#));
        assert!(!html.contains(r#"data-field="password""#));
    }

    #[test]
    fn test_login_template_escapes_input() {
        let mut form = LoginForm::blank(Some("/\"><script>".to_string()));
        form.username = "<b>bob</b>".to_string();

        let html = LoginTemplate::from_form(&form, "/login/").render().unwrap();
        assert!(!html.contains("<script>"));
        assert!(!html.contains("<b>bob</b>"));
    }

    #[test]
    fn test_index_template() {
        let page = IndexTemplate {
            page_title: "Index".to_string(),
            body_class: String::new(),
            username: "alice".to_string(),
            logout_url: "/logout/".to_string(),
        };
        let html = page.render().unwrap();
        assert!(html.contains("Signed in as alice"));
        assert!(html.contains(r#"href="/logout/""#));
    }
}
