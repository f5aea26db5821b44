use std::time::{Duration, Instant};

use facelens_core::detection::domain::expression::Expression;
use facelens_core::detection::domain::face_analyzer::Gender;
use facelens_core::pipeline::session::DashboardState;

/// How many local ticks pass between dashboard redraws. At the default
/// 200 ms cadence this refreshes once a second.
const REFRESH_EVERY_TICKS: usize = 5;

pub fn gender_label(gender: Gender) -> &'static str {
    match gender {
        Gender::Male => "Nam",
        Gender::Female => "Nữ",
    }
}

/// Mental-state wording for the expression line.
pub fn mental_state_label(expression: Expression) -> &'static str {
    match expression {
        Expression::Happy => "Vui vẻ",
        Expression::Sad => "Buồn",
        Expression::Angry => "Tức giận",
        Expression::Surprised => "Ngạc nhiên",
        Expression::Fearful => "Sợ hãi",
        Expression::Disgusted => "Ghê tởm",
        Expression::Neutral => "Trung tính",
    }
}

/// Presenter for the analysis session: prints the merged result as
/// localized text, throttled, and stops the session when the optional
/// duration bound elapses.
pub struct TerminalDashboard {
    ticks: usize,
    deadline: Option<Instant>,
}

impl TerminalDashboard {
    pub fn new(duration: Option<Duration>) -> Self {
        Self {
            ticks: 0,
            deadline: duration.map(|d| Instant::now() + d),
        }
    }

    /// Session presenter callback. Returns `false` to stop the session.
    pub fn update(&mut self, state: &DashboardState<'_>) -> bool {
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return false;
            }
        }

        self.ticks += 1;
        if self.ticks % REFRESH_EVERY_TICKS == 0 {
            for line in render_lines(state) {
                println!("{line}");
            }
            println!();
        }
        true
    }
}

/// The dashboard body as text lines; pure so it can be tested.
pub fn render_lines(state: &DashboardState<'_>) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("── Kết quả Phân tích ──".to_string());
    if let Some(message) = state.remote_error {
        lines.push(format!("⚠ {message}"));
    }
    if state.enriching {
        lines.push("Đang phân tích nâng cao...".to_string());
    }

    let result = state.result;

    let gender = match (result.gender, result.gender_probability) {
        (Some(g), Some(p)) => format!("{} ({p}%)", gender_label(g)),
        (Some(g), None) => gender_label(g).to_string(),
        _ => "--".to_string(),
    };
    lines.push(format!("Giới tính: {gender}"));

    let age = result
        .age
        .map(|a| format!("{a} tuổi"))
        .unwrap_or_else(|| "--".to_string());
    lines.push(format!("Tuổi: {age}"));

    let mood = result
        .expression
        .map(|e| mental_state_label(e).to_string())
        .unwrap_or_else(|| "--".to_string());
    lines.push(format!("Tâm trạng: {mood}"));

    lines.push(format!(
        "Nhân chủng học: {}",
        result.ethnicity.as_deref().unwrap_or("--")
    ));
    lines.push(format!(
        "Làn da: {}",
        result.skin_health.as_deref().unwrap_or("--")
    ));
    lines.push(format!(
        "Thể chất: {}",
        result.physical_state.as_deref().unwrap_or("--")
    ));

    lines
}
