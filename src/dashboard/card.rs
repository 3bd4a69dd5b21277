use std::fmt::Write as _;

use crate::models::Resource;

/// Card accents, picked by day so a day always gets the same gradient.
pub const GRADIENTS: [&str; 10] = [
    "linear-gradient(135deg, #ff006e, #8338ec)",
    "linear-gradient(135deg, #8338ec, #00f2ea)",
    "linear-gradient(135deg, #00f2ea, #3a86ff)",
    "linear-gradient(135deg, #3a86ff, #ff006e)",
    "linear-gradient(135deg, #ff006e, #fb5607)",
    "linear-gradient(135deg, #fb5607, #ffbe0b)",
    "linear-gradient(135deg, #ffbe0b, #00f2ea)",
    "linear-gradient(135deg, #00f2ea, #8338ec)",
    "linear-gradient(135deg, #8338ec, #ff006e)",
    "linear-gradient(135deg, #ff006e, #3a86ff)",
];

pub fn gradient_for(day: u32) -> &'static str {
    let index = (day.max(1) - 1) as usize % GRADIENTS.len();
    GRADIENTS[index]
}

/// Render the day card fragment. Every line ends with a newline.
pub fn card_html(resource: &Resource) -> String {
    let day = resource.day;
    let title = escape_html(&resource.title);

    let mut points = String::new();
    for point in &resource.key_points {
        let _ = writeln!(points, "                            <li>{}</li>", escape_html(point));
    }

    format!(
        r#"                <!-- Day {day} -->
                <div class="day-card">
                    <div class="day-card-image" style="background: {gradient};">
                        <div class="day-number-overlay">Day {day}</div>
                    </div>
                    <div class="day-card-content">
                        <span class="day-badge">Day {day} • {category}</span>
                        <h3 class="day-title">{title}</h3>
                        <p class="day-description">{hook}</p>
                        <ul class="day-points">
{points}                        </ul>
                        <button class="download-btn locked-btn" onclick="showPasswordModal('day{day}', '{title_js}')">
                            🔒 Unlock Day {day} PDF
                        </button>
                    </div>
                </div>
"#,
        gradient = gradient_for(day),
        category = escape_html(&resource.category),
        hook = escape_html(&resource.hook),
        title_js = escape_html(&escape_js(&resource.title)),
    )
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Escape for a single-quoted JavaScript string literal.
pub fn escape_js(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            other => out.push(other),
        }
    }
    out
}
