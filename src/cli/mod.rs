pub mod ask;
pub mod chat;
pub mod status;

use iris::oracle::QueryResult;
use iris::router::Classification;

/// Append the backend and persistence footer shown under each reply.
///
/// The "not saved" note only appears when a database id is configured,
/// since otherwise nothing was expected to be saved.
pub fn render_reply(result: &QueryResult, database_configured: bool) -> String {
    let mut text = result.response.clone();

    match result.classification {
        Classification::Calculation => text.push_str("\n\n[computed with Wolfram|Alpha]"),
        Classification::Conversation => text.push_str("\n\n[answered by GPT]"),
        Classification::Error => return text,
    }

    if result.saved {
        text.push_str(" · saved to Notion");
    } else if database_configured {
        text.push_str(" · could not save to Notion");
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(classification: Classification, saved: bool) -> QueryResult {
        QueryResult {
            response: "4".into(),
            classification,
            saved,
        }
    }

    #[test]
    fn calculation_footer_names_engine() {
        let text = render_reply(&result(Classification::Calculation, true), true);
        assert_eq!(text, "4\n\n[computed with Wolfram|Alpha] · saved to Notion");
    }

    #[test]
    fn save_failure_shown_only_with_database() {
        let with_db = render_reply(&result(Classification::Conversation, false), true);
        assert!(with_db.ends_with("could not save to Notion"));

        let without_db = render_reply(&result(Classification::Conversation, false), false);
        assert!(without_db.ends_with("[answered by GPT]"));
    }

    #[test]
    fn errors_have_no_footer() {
        assert_eq!(render_reply(&result(Classification::Error, false), true), "4");
    }
}
