//! Placeholder template engine for application emails.
//!
//! Tokens are `{name}`-delimited. Known tokens are replaced everywhere they
//! occur; any other brace-delimited text is copied through verbatim, so a
//! template can never fail to render.
//!
//! Values are inserted as-is. Substitution is a single left-to-right pass, so
//! a value that itself contains `{token}` text is not expanded again.

/// Substituted for `{recruiter_name}` when no recruiter is known.
pub const FALLBACK_RECRUITER_NAME: &str = "Hiring Team";

/// The named values a template may reference.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateValues<'a> {
    pub recruiter_name: Option<&'a str>,
    pub user_name: &'a str,
    pub job_title: &'a str,
    pub company_name: &'a str,
    pub custom_sentence: &'a str,
    pub portfolio: &'a str,
}

impl<'a> TemplateValues<'a> {
    fn lookup(&self, token: &str) -> Option<&'a str> {
        match token {
            "recruiter_name" => Some(
                self.recruiter_name
                    .filter(|name| !name.trim().is_empty())
                    .unwrap_or(FALLBACK_RECRUITER_NAME),
            ),
            "user_name" => Some(self.user_name),
            "job_title" => Some(self.job_title),
            "company_name" => Some(self.company_name),
            "custom_sentence" => Some(self.custom_sentence),
            "portfolio" => Some(self.portfolio),
            _ => None,
        }
    }
}

/// Renders `template`, replacing every recognised `{token}` with its value.
pub fn render(template: &str, values: &TemplateValues<'_>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        match after.find(['{', '}']) {
            Some(close) if after.as_bytes()[close] == b'}' => {
                let token = &after[..close];
                match values.lookup(token) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(token);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            // Unclosed, or another `{` opens first: this brace is literal text.
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Wraps a plain-text body for an HTML email.
///
/// Only newlines are converted (to `<br>`). Nothing is HTML-escaped: template
/// values containing markup are sent as markup. This is a known limitation.
pub fn to_html_body(body: &str) -> String {
    format!("<div>{}</div>", body.replace('\n', "<br>"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_values() -> TemplateValues<'static> {
        TemplateValues {
            recruiter_name: Some("Dana Scully"),
            user_name: "Fox",
            job_title: "SWE",
            company_name: "Acme",
            custom_sentence: "I like APIs.",
            portfolio: "https://fox.dev",
        }
    }

    #[test]
    fn test_every_occurrence_is_replaced() {
        let out = render(
            "{company_name} and {company_name} again, {job_title}",
            &sample_values(),
        );
        assert_eq!(out, "Acme and Acme again, SWE");
    }

    #[test]
    fn test_all_known_tokens() {
        let out = render(
            "Hi {recruiter_name}, I'm {user_name}. {custom_sentence} See {portfolio}. Re: {job_title} @ {company_name}",
            &sample_values(),
        );
        assert_eq!(
            out,
            "Hi Dana Scully, I'm Fox. I like APIs. See https://fox.dev. Re: SWE @ Acme"
        );
    }

    #[test]
    fn test_unknown_tokens_are_preserved() {
        let out = render("Dear {hiring_manager}, {user_name}", &sample_values());
        assert_eq!(out, "Dear {hiring_manager}, Fox");
    }

    #[test]
    fn test_missing_recruiter_uses_fallback() {
        let values = TemplateValues {
            recruiter_name: None,
            ..sample_values()
        };
        let out = render("Hi {recruiter_name}. Bye {recruiter_name}.", &values);
        assert_eq!(out, "Hi Hiring Team. Bye Hiring Team.");
    }

    #[test]
    fn test_empty_recruiter_uses_fallback() {
        let values = TemplateValues {
            recruiter_name: Some(""),
            ..sample_values()
        };
        assert_eq!(render("Hi {recruiter_name}", &values), "Hi Hiring Team");
    }

    #[test]
    fn test_rendering_substituted_output_is_identity() {
        let once = render("Hi {recruiter_name}, {custom_sentence}", &sample_values());
        let twice = render(&once, &sample_values());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_values_are_not_expanded_recursively() {
        let values = TemplateValues {
            custom_sentence: "{user_name}",
            ..sample_values()
        };
        assert_eq!(render("{custom_sentence}", &values), "{user_name}");
    }

    #[test]
    fn test_stray_braces_are_literal() {
        let values = sample_values();
        assert_eq!(render("a { b", &values), "a { b");
        assert_eq!(render("a } b", &values), "a } b");
        assert_eq!(render("{{user_name}}", &values), "{Fox}");
        assert_eq!(render("{ {job_title}", &values), "{ SWE");
    }

    #[test]
    fn test_empty_template() {
        assert_eq!(render("", &sample_values()), "");
    }

    #[test]
    fn test_end_to_end_example_without_recruiter() {
        let values = TemplateValues {
            recruiter_name: None,
            user_name: "",
            job_title: "SWE",
            company_name: "Acme",
            custom_sentence: "My experience with Go and SQL aligns well with building APIs.",
            portfolio: "",
        };
        let out = render("Hi {recruiter_name}, ... {custom_sentence} ...", &values);
        assert_eq!(
            out,
            "Hi Hiring Team, ... My experience with Go and SQL aligns well with building APIs. ..."
        );
    }

    #[test]
    fn test_html_body_converts_newlines_only() {
        assert_eq!(
            to_html_body("Hi <b>team</b>\n\nThanks"),
            "<div>Hi <b>team</b><br><br>Thanks</div>"
        );
    }
}
