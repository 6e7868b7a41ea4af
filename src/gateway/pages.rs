use crate::crew::RunOutput;
use crate::error::ItineraError;
use crate::prompt::TeraEngine;
use serde::Serialize;
use tera::Context;

const INDEX_NAME: &str = "index.html";

const INDEX_TEMPLATE: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Smart Travel Assistant</title>
  <style>
    body { font-family: system-ui, sans-serif; max-width: 52rem; margin: 2rem auto; padding: 0 1rem; }
    label { display: block; margin-top: .75rem; }
    input { width: 100%; padding: .4rem; }
    .row { display: flex; gap: 1rem; }
    .row label { flex: 1; }
    .actions { display: flex; gap: .5rem; margin-top: 1rem; }
    .error { background: #fdecea; border-left: 4px solid #d93025; padding: .75rem; }
    .notice { background: #fff8e1; border-left: 4px solid #f9a825; padding: .75rem; }
    .success { background: #e6f4ea; border-left: 4px solid #188038; padding: .75rem; }
    pre { white-space: pre-wrap; background: #f6f8fa; padding: 1rem; }
  </style>
</head>
<body>
  <h1>Smart Travel Assistant</h1>
{% if notice %}  <p class="notice">{{ notice }}</p>
{% endif %}{% if error %}  <p class="error"><strong>{{ error.kind }}</strong>: {{ error.message }}</p>
{% endif %}
  <form method="post" action="/plan">
    <input type="hidden" name="session_id" value="{{ session_id }}">
    <label>Traveling From: <input name="origin" value="{{ form.origin }}"></label>
    <label>Destination City: <input name="destination" value="{{ form.destination }}" required></label>
    <div class="row">
      <label>Arrival Date <input type="date" name="start_date" value="{{ form.start_date }}" required></label>
      <label>Departure Date <input type="date" name="end_date" value="{{ form.end_date }}" required></label>
    </div>
    <label>Interests: <input name="interests" value="{{ form.interests }}"></label>
    <div class="actions">
      <button type="submit"{% if revoked %} disabled{% endif %}>Generate Travel Plan</button>
    </div>
  </form>
  <div class="actions">
    <form method="post" action="/session/reset">
      <input type="hidden" name="session_id" value="{{ session_id }}">
      <button type="submit">Clear Chat History</button>
    </form>
    <form method="post" action="/session/terminate">
      <input type="hidden" name="session_id" value="{{ session_id }}">
      <button type="submit">Terminate API Usage</button>
    </form>
  </div>
{% if result %}
  <p class="success">Travel plan generated!</p>
  <pre id="itinerary">{{ result.final_text }}</pre>
{% for section in result.sections %}
  <details>
    <summary>{{ section.task_id }} ({{ section.role }})</summary>
    <pre>{{ section.text }}</pre>
  </details>
{% endfor %}{% endif %}
</body>
</html>
"#;

/// Values echoed back into the form.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FormValues {
    pub origin: String,
    pub destination: String,
    pub start_date: String,
    pub end_date: String,
    pub interests: String,
}

impl FormValues {
    pub fn defaults() -> Self {
        let today = chrono::Local::now().date_naive().format("%Y-%m-%d").to_string();
        Self {
            origin: crate::trip::DEFAULT_ORIGIN.into(),
            destination: crate::trip::DEFAULT_DESTINATION.into(),
            start_date: today.clone(),
            end_date: today,
            interests: crate::trip::DEFAULT_INTERESTS.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorView<'a> {
    kind: &'a str,
    message: String,
}

#[derive(Debug, Serialize)]
struct SectionView<'a> {
    task_id: &'a str,
    role: &'a str,
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct ResultView<'a> {
    final_text: &'a str,
    sections: Vec<SectionView<'a>>,
}

/// One page render.
#[derive(Debug, Default)]
pub struct PageView<'a> {
    pub session_id: String,
    pub form: FormValues,
    pub notice: Option<&'a str>,
    pub error: Option<&'a ItineraError>,
    pub output: Option<&'a RunOutput>,
    pub revoked: bool,
}

pub struct Pages {
    engine: TeraEngine,
}

impl Pages {
    pub fn new() -> anyhow::Result<Self> {
        let mut engine = TeraEngine::new();
        engine.add_template(INDEX_NAME, INDEX_TEMPLATE)?;
        Ok(Self { engine })
    }

    pub fn render(&self, view: &PageView<'_>) -> anyhow::Result<String> {
        let mut ctx = Context::new();
        ctx.insert("session_id", &view.session_id);
        ctx.insert("form", &view.form);
        ctx.insert("notice", &view.notice);
        ctx.insert("revoked", &view.revoked);
        ctx.insert(
            "error",
            &view.error.map(|error| ErrorView {
                kind: error.kind(),
                message: error.to_string(),
            }),
        );
        ctx.insert(
            "result",
            &view.output.map(|output| ResultView {
                final_text: &output.final_result.text,
                sections: output
                    .results
                    .iter()
                    .filter(|result| result.task_id != output.final_result.task_id)
                    .map(|result| SectionView {
                        task_id: result.task_id.as_str(),
                        role: &result.agent_role,
                        text: &result.text,
                    })
                    .collect(),
            }),
        );
        self.engine.render(INDEX_NAME, &ctx)
    }
}
