// 🎨 Dashboard HTML: forms, word clouds, cards, quotes and the project register

use crate::app::CloudKind;
use crate::display::ImpactCard;
use crate::error::{RegisterError, ValidationErrors};
use crate::form::{ImpactForm, QuoteForm, MAX_BLURB_CHARS, MAX_YEAR, MIN_YEAR};
use crate::records::{Area, Month, QuoteEntry};
use crate::register::ProjectRegister;
use crate::wordcloud::WordFrequencies;

/// Message shown above the forms
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Submitted(&'static str),
    Invalid(Vec<String>),
    StoreFailed(String),
}

impl Notice {
    pub fn invalid(errors: &ValidationErrors) -> Self {
        Notice::Invalid(
            errors
                .iter()
                .map(|(field, msg)| format!("{} {}", field, msg))
                .collect(),
        )
    }
}

/// Everything the dashboard shows. Each section fails on its own.
pub struct DashboardView {
    pub cards: Result<Vec<ImpactCard>, String>,
    pub quotes: Result<Vec<QuoteEntry>, String>,
    pub clouds: Vec<(CloudKind, Result<WordFrequencies, String>)>,
    pub register: Result<ProjectRegister, RegisterError>,
}

pub fn render_dashboard(
    view: &DashboardView,
    impact_form: &ImpactForm,
    quote_form: &QuoteForm,
    notice: Option<&Notice>,
) -> String {
    let mut content = String::new();

    if let Some(notice) = notice {
        content.push_str(&render_notice(notice));
    }

    content.push_str(r#"<div class="columns">"#);
    content.push_str(&render_impact_form(impact_form));
    content.push_str(&render_quote_form(quote_form));
    content.push_str("</div>");

    content.push_str(r#"<div class="columns">"#);
    for (kind, cloud) in &view.clouds {
        content.push_str(&render_cloud(*kind, cloud));
    }
    content.push_str("</div>");

    content.push_str(&render_cards(&view.cards));
    content.push_str(&render_quotes(&view.quotes));
    content.push_str(&render_register(&view.register));

    build_page("PIMS - The PenCHORD Impact Store", &content)
}

fn render_notice(notice: &Notice) -> String {
    match notice {
        Notice::Submitted(what) => format!(
            r#"<div class="notice notice-ok">Thanks! Your {} has been saved.</div>"#,
            html_escape(what)
        ),
        Notice::Invalid(problems) => {
            let items: String = problems
                .iter()
                .map(|p| format!("<li>{}</li>", html_escape(p)))
                .collect();
            format!(
                r#"<div class="notice notice-error">Please fix the following:<ul>{}</ul></div>"#,
                items
            )
        }
        Notice::StoreFailed(message) => format!(
            r#"<div class="notice notice-error">Your submission could not be saved ({}). Your text is still in the form; please try again.</div>"#,
            html_escape(message)
        ),
    }
}

fn options<T: Copy>(values: &[T], label: fn(&T) -> &'static str, selected: &str) -> String {
    values
        .iter()
        .map(|v| {
            let l = label(v);
            let sel = if l == selected { " selected" } else { "" };
            format!(r#"<option value="{l}"{sel}>{l}</option>"#, l = html_escape(l), sel = sel)
        })
        .collect()
}

fn render_impact_form(form: &ImpactForm) -> String {
    format!(
        r#"<form class="panel" method="post" action="/impacts">
    <h2>Tell us about your impact</h2>
    <label>What's your name? <input name="name" value="{name}" required></label>
    <label>Which area of work? <select name="area">{areas}</select></label>
    <label>Month <select name="month">{months}</select></label>
    <label>Year <input name="year" type="number" min="{min}" max="{max}" value="{year}"></label>
    <label>What do you want to tell us? (Max {limit} characters)
        <textarea name="blurb" maxlength="{limit}" required>{blurb}</textarea></label>
    <label>Link (optional) <input name="link" value="{link}"></label>
    <button type="submit">Submit impact</button>
</form>"#,
        name = html_escape(&form.name),
        areas = options(&Area::ALL, Area::as_str, &form.area),
        months = options(&Month::ALL, Month::as_str, &form.month),
        min = MIN_YEAR,
        max = MAX_YEAR,
        year = html_escape(&form.year),
        limit = MAX_BLURB_CHARS,
        blurb = html_escape(&form.blurb),
        link = html_escape(&form.link),
    )
}

fn render_quote_form(form: &QuoteForm) -> String {
    format!(
        r#"<form class="panel" method="post" action="/quotes">
    <h2>Share a quote</h2>
    <label>Your name <input name="name" value="{name}" required></label>
    <label>Organisation <input name="org" value="{org}" required></label>
    <label>Quote <textarea name="quote" required>{quote}</textarea></label>
    <button type="submit">Submit quote</button>
</form>"#,
        name = html_escape(&form.name),
        org = html_escape(&form.org),
        quote = html_escape(&form.quote),
    )
}

fn render_cloud(kind: CloudKind, cloud: &Result<WordFrequencies, String>) -> String {
    let body = match cloud {
        Err(message) => format!(
            r#"<p class="muted">Word cloud unavailable: {}</p>"#,
            html_escape(message)
        ),
        Ok(freq) if freq.is_empty() => {
            r#"<p class="muted">Nothing to show yet.</p>"#.to_string()
        }
        Ok(freq) => freq
            .words
            .iter()
            .map(|w| {
                let size = 0.8 + 1.6 * freq.relative_weight(w.count);
                format!(
                    r#"<span class="word" style="font-size:{:.2}em" title="{}">{}</span> "#,
                    size,
                    w.count,
                    html_escape(&w.word)
                )
            })
            .collect(),
    };

    format!(
        r#"<section class="panel cloud"><h2>{}</h2>{}</section>"#,
        html_escape(kind.title()),
        body
    )
}

fn render_cards(cards: &Result<Vec<ImpactCard>, String>) -> String {
    let mut html = String::from(r#"<section><h2>Impact</h2>"#);

    match cards {
        Err(message) => html.push_str(&format!(
            r#"<p class="notice notice-error">Could not load impact entries: {}</p>"#,
            html_escape(message)
        )),
        Ok(cards) if cards.is_empty() => {
            html.push_str(r#"<p class="muted">No impact stories yet. Be the first!</p>"#)
        }
        Ok(cards) => {
            for card in cards {
                let link = card
                    .entry
                    .link
                    .as_deref()
                    .map(|url| {
                        format!(
                            r#"<a href="{u}" rel="noopener">{u}</a>"#,
                            u = html_escape(url)
                        )
                    })
                    .unwrap_or_default();

                html.push_str(&format!(
                    r#"<div class="card {class}"><strong>{heading}</strong><p>{blurb}</p>{link}</div>"#,
                    class = card.style.css_class(),
                    heading = html_escape(&card.heading()),
                    blurb = html_escape(&card.entry.blurb),
                    link = link,
                ));
            }
        }
    }

    html.push_str("</section>");
    html
}

fn render_quotes(quotes: &Result<Vec<QuoteEntry>, String>) -> String {
    let mut html = String::from(r#"<section><h2>Quotes</h2>"#);

    match quotes {
        Err(message) => html.push_str(&format!(
            r#"<p class="notice notice-error">Could not load quotes: {}</p>"#,
            html_escape(message)
        )),
        Ok(quotes) if quotes.is_empty() => {
            html.push_str(r#"<p class="muted">No quotes yet.</p>"#)
        }
        Ok(quotes) => {
            for q in quotes {
                html.push_str(&format!(
                    r#"<blockquote class="quote">“{}”<footer>{}, {}</footer></blockquote>"#,
                    html_escape(&q.quote),
                    html_escape(&q.name),
                    html_escape(&q.org),
                ));
            }
        }
    }

    html.push_str("</section>");
    html
}

fn render_register(register: &Result<ProjectRegister, RegisterError>) -> String {
    let mut html = String::from(r#"<section><h2>Project register</h2>"#);

    match register {
        Err(RegisterError::NotConfigured) => {
            html.push_str(r#"<p class="muted">No project register configured.</p>"#)
        }
        Err(e) => html.push_str(&format!(
            r#"<p class="muted">Project register unavailable: {}</p>"#,
            html_escape(&e.to_string())
        )),
        Ok(register) => {
            html.push_str(
                "<table><tr><th>Code</th><th>Title</th><th>Lead Org</th><th>Lead</th>\
                 <th>Impact / Outcomes</th><th>Method Area(s)</th><th>Notes</th></tr>",
            );
            for row in register.impact_projects() {
                html.push_str(&format!(
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                    html_escape(&row.code),
                    html_escape(&row.title),
                    html_escape(&row.lead_org),
                    html_escape(&row.lead),
                    html_escape(&row.impact),
                    html_escape(&row.method_areas),
                    html_escape(&row.notes),
                ));
            }
            html.push_str("</table>");
        }
    }

    html.push_str("</section>");
    html
}

fn build_page(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>
body {{ font-family: system-ui, sans-serif; margin: 0; background: #f7f7f9; color: #222; }}
main {{ max-width: 1100px; margin: 0 auto; padding: 24px; }}
.columns {{ display: flex; gap: 16px; flex-wrap: wrap; }}
.columns > * {{ flex: 1 1 300px; }}
.panel {{ background: #fff; border: 1px solid #ddd; border-radius: 8px; padding: 16px; margin-bottom: 16px; }}
label {{ display: block; margin-bottom: 10px; }}
input, select, textarea {{ width: 100%; box-sizing: border-box; padding: 6px; }}
textarea {{ min-height: 80px; }}
.card {{ border-radius: 8px; padding: 12px 16px; margin-bottom: 10px; }}
.card-info {{ background: #e3f2fd; border-left: 4px solid #1565c0; }}
.card-success {{ background: #e8f5e9; border-left: 4px solid #2e7d32; }}
.quote {{ background: #fff; border-left: 4px solid #7b1fa2; margin: 0 0 10px; padding: 12px 16px; }}
.quote footer {{ color: #666; font-size: 0.9em; margin-top: 6px; }}
.notice {{ border-radius: 8px; padding: 12px 16px; margin-bottom: 16px; }}
.notice-ok {{ background: #e8f5e9; }}
.notice-error {{ background: #ffebee; }}
.muted {{ color: #888; }}
.word {{ display: inline-block; margin: 2px 6px; }}
table {{ border-collapse: collapse; width: 100%; background: #fff; }}
th, td {{ border: 1px solid #ddd; padding: 6px; text-align: left; vertical-align: top; }}
</style>
</head>
<body>
<main>
<h1>Welcome to PIMS - The PenCHORD Impact Store</h1>
{content}
</main>
</body>
</html>"#,
        title = html_escape(title),
        content = content,
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
