//! Plain-text rendering for the terminal client.

use std::fmt::Write;

use askany_shared::{Question, SessionMode, Stats};

use crate::events::{Notice, NoticeLevel};
use crate::reconcile::Arrangement;
use crate::state::SessionView;

pub fn render_view(view: &SessionView) -> String {
    let mut out = String::new();

    let title = view
        .session
        .as_ref()
        .map_or("Live Questions", |s| s.display_title());
    let mode = view.view_mode().mode;
    let _ = write!(out, "== {title} ({})", view.slug);
    if mode == SessionMode::Spotlight {
        out.push_str(" [spotlight]");
    }
    if view.context.is_owner {
        out.push_str(" [owner]");
    }
    out.push('\n');

    out.push_str(&render_arrangement(&view.arrangement(), view.context.is_owner));
    out
}

pub fn render_arrangement(arrangement: &Arrangement, is_owner: bool) -> String {
    let mut out = String::new();

    if !arrangement.spotlighted.is_empty() {
        out.push_str("-- Spotlighted\n");
        push_questions(&mut out, &arrangement.spotlighted, is_owner);
        out.push_str("-- Other questions\n");
    }

    if arrangement.unanswered.is_empty() && arrangement.spotlighted.is_empty() {
        out.push_str("   No questions yet. Be the first to ask!\n");
    } else {
        push_questions(&mut out, &arrangement.unanswered, is_owner);
    }

    if !arrangement.answered.is_empty() {
        out.push_str("-- Answered\n");
        push_questions(&mut out, &arrangement.answered, is_owner);
    }

    out
}

fn push_questions(out: &mut String, questions: &[Question], is_owner: bool) {
    for q in questions {
        let _ = write!(
            out,
            "  #{:<6} ^{:<4} {}  ({})",
            q.id,
            q.upvote_count,
            q.content,
            q.display_name()
        );
        if q.is_mine {
            out.push_str(" [mine]");
        }
        if is_owner && q.spotlighted() {
            out.push_str(" [spotlight]");
        }
        out.push('\n');
    }
}

pub fn render_stats(stats: &Stats) -> String {
    format!(
        "Total sessions: {}\nTotal participants: {}\nLast updated: {}\n",
        stats.total_sessions,
        stats.total_participants,
        stats.last_updated.format("%Y-%m-%d")
    )
}

pub fn render_notice(notice: &Notice) -> String {
    let tag = match notice.level {
        NoticeLevel::Info => "info",
        NoticeLevel::Success => "ok",
        NoticeLevel::Error => "error",
    };
    format!("[{tag}] {}", notice.message)
}
