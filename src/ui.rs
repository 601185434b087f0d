//! Overlay and HUD view models
//!
//! Screens are rendered to HTML strings here and inserted by the platform
//! layer, so their content is testable without a DOM.

use crate::sim::GameState;

// ── Element ids ────────────────────────────────────────────────────

pub const SCORE_ELEMENT: &str = "score";
pub const HIGH_SCORE_ELEMENT: &str = "highScore";
pub const LEVEL_ELEMENT: &str = "level";
pub const ACHIEVEMENTS_LIST: &str = "achievementsList";

pub const GAME_OVER_OVERLAY: &str = "gameOverOverlay";
pub const VICTORY_OVERLAY: &str = "victoryOverlay";

/// Full-screen dimmed backdrop shared by both overlays
pub const OVERLAY_STYLE: &str = "position: fixed; top: 0; left: 0; width: 100%; height: 100%; \
     background: rgba(0,0,0,0.85); display: flex; justify-content: center; \
     align-items: center; z-index: 1000;";

const CONTENT_STYLE: &str = "background: #2d2d44; padding: 40px; border-radius: 15px; \
     text-align: center; border: 2px solid #6c63ff;";

const BUTTON_STYLE: &str = "background: linear-gradient(90deg, #6c63ff, #5a52d5); color: white; \
     border: none; padding: 15px 30px; border-radius: 8px; font-size: 1.2rem; \
     cursor: pointer; margin-top: 20px;";

/// Escape text for use inside HTML element content or quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Text for the score, high score and level displays, keyed by element id
pub fn hud_text(state: &GameState) -> [(&'static str, String); 3] {
    [
        (SCORE_ELEMENT, state.score.to_string()),
        (HIGH_SCORE_ELEMENT, state.high_score.to_string()),
        (LEVEL_ELEMENT, state.level.to_string()),
    ]
}

/// Buttons an overlay can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayButton {
    Restart,
    NextLevel,
    Replay,
}

impl OverlayButton {
    /// DOM id of the button
    pub fn id(&self) -> &'static str {
        match self {
            OverlayButton::Restart => "restartBtn",
            OverlayButton::NextLevel => "nextLevelBtn",
            OverlayButton::Replay => "replayBtn",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OverlayButton::Restart => "Play Again",
            OverlayButton::NextLevel => "Next Level",
            OverlayButton::Replay => "Restart",
        }
    }

    fn to_html(self) -> String {
        format!(
            r#"<button id="{}" style="{}">{}</button>"#,
            self.id(),
            BUTTON_STYLE,
            self.label()
        )
    }
}

/// A modal screen shown over the canvas
pub trait Overlay {
    /// DOM id of the overlay root
    fn element_id(&self) -> &'static str;
    /// Inner markup
    fn to_html(&self) -> String;
    /// Buttons present in the markup; clicking any of them closes the overlay
    fn buttons(&self) -> Vec<OverlayButton>;
}

/// "Game Over" screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameOverScreen {
    pub title: String,
    pub score: i64,
    pub high_score: i64,
    pub new_record: bool,
}

impl GameOverScreen {
    pub const DEFAULT_TITLE: &'static str = "Game Over";

    /// Screen for the current score and high score
    pub fn from_state(state: &GameState, new_record: bool) -> Self {
        Self {
            title: Self::DEFAULT_TITLE.to_string(),
            score: state.score,
            high_score: state.high_score,
            new_record,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

impl Overlay for GameOverScreen {
    fn element_id(&self) -> &'static str {
        GAME_OVER_OVERLAY
    }

    fn to_html(&self) -> String {
        let mut html = String::with_capacity(768);
        html.push_str(&format!(
            r#"<div class="game-over-content" style="{}">"#,
            CONTENT_STYLE
        ));
        html.push_str(&format!("<h2>{}</h2>", escape_html(&self.title)));
        html.push_str(&format!(
            r#"<p>Score: <span class="final-score">{}</span></p>"#,
            self.score
        ));
        if self.new_record {
            html.push_str(r#"<p class="new-record">🎉 New Record! 🎉</p>"#);
        }
        html.push_str(&format!("<p>High Score: {}</p>", self.high_score));
        html.push_str(&OverlayButton::Restart.to_html());
        html.push_str("</div>");
        html
    }

    fn buttons(&self) -> Vec<OverlayButton> {
        vec![OverlayButton::Restart]
    }
}

/// Level/game complete screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VictoryScreen {
    pub title: String,
    pub subtitle: Option<String>,
    pub score: i64,
    pub show_next: bool,
    pub show_replay: bool,
}

impl VictoryScreen {
    pub const DEFAULT_TITLE: &'static str = "Level Complete!";

    pub fn from_state(state: &GameState) -> Self {
        Self {
            title: Self::DEFAULT_TITLE.to_string(),
            subtitle: None,
            score: state.score,
            show_next: false,
            show_replay: false,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn with_next(mut self) -> Self {
        self.show_next = true;
        self
    }

    pub fn with_replay(mut self) -> Self {
        self.show_replay = true;
        self
    }
}

impl Overlay for VictoryScreen {
    fn element_id(&self) -> &'static str {
        VICTORY_OVERLAY
    }

    fn to_html(&self) -> String {
        let mut html = String::with_capacity(768);
        html.push_str(&format!(
            r#"<div class="victory-content" style="{}">"#,
            CONTENT_STYLE
        ));
        html.push_str(&format!("<h2>{}</h2>", escape_html(&self.title)));
        if let Some(subtitle) = self.subtitle.as_deref().filter(|s| !s.is_empty()) {
            html.push_str(&format!("<p>{}</p>", escape_html(subtitle)));
        }
        html.push_str(&format!(
            r#"<p class="final-score">Score: {}</p>"#,
            self.score
        ));
        html.push_str(r#"<div class="victory-buttons">"#);
        for button in self.buttons() {
            html.push_str(&button.to_html());
        }
        html.push_str("</div></div>");
        html
    }

    fn buttons(&self) -> Vec<OverlayButton> {
        let mut buttons = Vec::new();
        if self.show_next {
            buttons.push(OverlayButton::NextLevel);
        }
        if self.show_replay {
            buttons.push(OverlayButton::Replay);
        }
        buttons
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_hud_text() {
        let mut state = GameState::new();
        state.score = 42;
        state.high_score = 99;
        state.level = 3;
        let hud = hud_text(&state);
        assert_eq!(hud[0], (SCORE_ELEMENT, "42".to_string()));
        assert_eq!(hud[1], (HIGH_SCORE_ELEMENT, "99".to_string()));
        assert_eq!(hud[2], (LEVEL_ELEMENT, "3".to_string()));
    }

    #[test]
    fn test_game_over_markup() {
        let mut state = GameState::new();
        state.score = 120;
        state.high_score = 120;

        let html = GameOverScreen::from_state(&state, true).to_html();
        assert!(html.contains("<h2>Game Over</h2>"));
        assert!(html.contains(r#"<span class="final-score">120</span>"#));
        assert!(html.contains("New Record!"));
        assert!(html.contains(r#"id="restartBtn""#));

        let html = GameOverScreen::from_state(&state, false).to_html();
        assert!(!html.contains("New Record!"));
    }

    #[test]
    fn test_titles_are_escaped() {
        let state = GameState::new();
        let html = GameOverScreen::from_state(&state, false)
            .with_title("<script>alert(1)</script>")
            .to_html();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_victory_buttons() {
        let state = GameState::new();
        let screen = VictoryScreen::from_state(&state);
        assert!(screen.buttons().is_empty());
        assert!(!screen.to_html().contains("<button"));

        let screen = VictoryScreen::from_state(&state)
            .with_subtitle("All gems collected")
            .with_next()
            .with_replay();
        assert_eq!(
            screen.buttons(),
            vec![OverlayButton::NextLevel, OverlayButton::Replay]
        );
        let html = screen.to_html();
        assert!(html.contains("<p>All gems collected</p>"));
        assert!(html.contains(r#"id="nextLevelBtn""#));
        assert!(html.contains(r#"id="replayBtn""#));
    }

    #[test]
    fn test_empty_subtitle_omitted() {
        let screen = VictoryScreen::from_state(&GameState::new()).with_subtitle("");
        assert_eq!(screen.to_html().matches("<p").count(), 1);
    }
}
