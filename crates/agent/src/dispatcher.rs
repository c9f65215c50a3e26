use std::sync::Arc;

use marquee_core::dataset::Catalog;
use marquee_core::domain::{Category, DraftAnswer, Evidence, EvidenceValue, Query};
use marquee_core::errors::{PipelineError, Severity};
use tracing::{debug, info, warn};

use crate::handlers::handler_for;
use crate::llm::ReasoningHandle;
use crate::prompts::PromptLibrary;
use crate::text::numbers_in;

const NO_MATCHES_TEXT: &str =
    "No titles in the catalog matched this request. Try broader terms, another genre or a \
     different audience setting.";

/// Routes a classified query to its handler. Handlers read the shared table; nothing
/// here mutates it.
#[derive(Clone)]
pub struct Dispatcher {
    catalog: Catalog,
    rephraser: Option<(Arc<PromptLibrary>, ReasoningHandle)>,
}

impl Dispatcher {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog, rephraser: None }
    }

    /// Lets the reasoning capability rewrite handler text. Figures stay local.
    pub fn with_rephraser(
        mut self,
        prompts: Arc<PromptLibrary>,
        reasoning: ReasoningHandle,
    ) -> Self {
        self.rephraser = Some((prompts, reasoning));
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub async fn dispatch(
        &self,
        category: Category,
        query: &Query,
    ) -> Result<DraftAnswer, PipelineError> {
        let table = self.catalog.table()?;
        let handler = handler_for(category);

        let draft = match handler.handle(query, table) {
            Ok(draft) => draft,
            Err(error) if error.severity() == Severity::Recoverable => {
                info!(
                    event_name = "dispatch.no_matches",
                    correlation_id = %query.request_id(),
                    category = category.as_str(),
                    detail = %error,
                    "handler found nothing to report"
                );
                no_matches(category, table.len() as u64, &error)
            }
            Err(error) => return Err(error),
        };
        debug!(
            event_name = "dispatch.draft_ready",
            correlation_id = %query.request_id(),
            category = category.as_str(),
            evidence_keys = draft.evidence.len(),
            "draft produced"
        );

        Ok(match &self.rephraser {
            Some((prompts, reasoning)) => rephrase(prompts, reasoning, query, draft).await,
            None => draft,
        })
    }
}

fn no_matches(category: Category, catalog_size: u64, error: &PipelineError) -> DraftAnswer {
    let evidence = Evidence::new()
        .with("match_count", EvidenceValue::Count(0))
        .with("catalog_size", EvidenceValue::Count(catalog_size));
    DraftAnswer::new(category, NO_MATCHES_TEXT, evidence).with_note(error.to_string())
}

/// The rewrite must repeat every local figure and introduce none of its own.
fn same_figures(local: &str, rewritten: &str) -> bool {
    let local_numbers = numbers_in(local);
    let rewritten_numbers = numbers_in(rewritten);
    local_numbers.iter().all(|number| rewritten_numbers.contains(number))
        && rewritten_numbers.iter().all(|number| local_numbers.contains(number))
}

/// Keeps the local text unless the rewrite carries exactly the figures it contained.
async fn rephrase(
    prompts: &PromptLibrary,
    reasoning: &ReasoningHandle,
    query: &Query,
    mut draft: DraftAnswer,
) -> DraftAnswer {
    let prompt = match prompts.rephrase(query.text(), &draft) {
        Ok(prompt) => prompt,
        Err(error) => {
            warn!(event_name = "dispatch.rephrase_prompt_failed", error = %error, "kept local text");
            draft.add_note("rephrasing skipped: prompt could not be rendered");
            return draft;
        }
    };

    match reasoning.complete(&prompt).await {
        Ok(text) if text.trim().is_empty() => {
            draft.add_note("rephrasing skipped: empty rewrite");
        }
        Ok(text) => {
            let rewritten = text.trim();
            if same_figures(&draft.text, rewritten) {
                draft.text = rewritten.to_owned();
            } else {
                draft.add_note("rephrasing discarded: rewrite changed the figures");
            }
        }
        Err(error) => {
            draft.add_note(format!("rephrasing skipped: {error}"));
        }
    }
    draft
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use marquee_core::dataset::{sample_table, Catalog};
    use marquee_core::domain::{Category, Query, QueryContext};
    use marquee_core::errors::PipelineError;

    use crate::dispatcher::Dispatcher;
    use crate::llm::ReasoningHandle;
    use crate::prompts::PromptLibrary;
    use crate::providers::ScriptedClient;

    fn query(text: &str) -> Query {
        Query::new(text, QueryContext::default()).expect("valid query")
    }

    fn with_client(client: ScriptedClient) -> Dispatcher {
        Dispatcher::new(Catalog::from_table(sample_table())).with_rephraser(
            Arc::new(PromptLibrary::new().expect("templates")),
            ReasoningHandle::new(Arc::new(client), Duration::from_millis(50)),
        )
    }

    #[tokio::test]
    async fn unavailable_dataset_is_fatal() {
        let dispatcher = Dispatcher::new(Catalog::Unavailable("missing".to_owned()));
        let error = dispatcher
            .dispatch(Category::Analytics, &query("korean share"))
            .await
            .expect_err("dataset unavailable");

        assert!(matches!(error, PipelineError::Dataset(_)));
        assert_eq!(error.reason(), "dataset unavailable");
    }

    #[tokio::test]
    async fn no_matching_data_becomes_a_no_matches_draft() {
        let dispatcher = Dispatcher::new(Catalog::from_table(sample_table()));
        let draft = dispatcher
            .dispatch(Category::Discovery, &query("find zyxwvut"))
            .await
            .expect("recoverable");

        assert_eq!(draft.evidence.count("match_count"), Some(0));
        assert_eq!(draft.evidence.count("catalog_size"), Some(200));
        assert!(draft.notes[0].starts_with("no matching data"));
    }

    async fn local_draft(category: Category, text: &str) -> String {
        Dispatcher::new(Catalog::from_table(sample_table()))
            .dispatch(category, &query(text))
            .await
            .expect("local draft")
            .text
    }

    #[tokio::test]
    async fn rewrite_keeping_numbers_replaces_text() {
        let question = "What percentage of the catalog is Korean content?";
        let local = local_draft(Category::Analytics, question).await;
        let dispatcher =
            with_client(ScriptedClient::new().with_default_reply(format!("In short: {local}")));

        let draft = dispatcher.dispatch(Category::Analytics, &query(question)).await.expect("draft");

        assert!(draft.notes.is_empty(), "{:?}", draft.notes);
        assert!(draft.text.starts_with("In short: 15% of the catalog"));
    }

    #[tokio::test]
    async fn rewrite_adding_figures_is_discarded() {
        let question = "How do I cancel my subscription?";
        let local = local_draft(Category::Support, question).await;
        let dispatcher = with_client(ScriptedClient::new().with_default_reply(format!(
            "{local} Also, 97% of subscribers who cancel come back within 3 days."
        )));

        let draft = dispatcher.dispatch(Category::Support, &query(question)).await.expect("draft");

        assert_eq!(draft.text, local);
        assert!(!draft.text.contains("97%"));
        assert!(draft.notes.iter().any(|note| note.contains("changed the figures")));
    }

    #[test]
    fn figures_must_match_in_both_directions() {
        assert!(super::same_figures("15% of 200 titles", "Of 200 titles, 15% qualify"));
        assert!(!super::same_figures("15% of 200 titles", "15% of titles"));
        assert!(!super::same_figures("15% of 200 titles", "15% of 200 titles, up 4 points"));
        assert!(super::same_figures("No figures here.", "Still none."));
    }

    #[tokio::test]
    async fn rewrite_that_changes_numbers_is_discarded() {
        let dispatcher = with_client(ScriptedClient::new().with_default_reply("Korean content is about a quarter."));
        let draft = dispatcher
            .dispatch(Category::Analytics, &query("What percentage of the catalog is Korean content?"))
            .await
            .expect("draft");

        assert!(draft.text.starts_with("15% of the catalog is Korean content"));
        assert_eq!(draft.evidence.percentage("percentage"), Some(15.0));
        assert!(draft.notes.iter().any(|note| note.contains("changed the figures")));
    }

    #[tokio::test]
    async fn unreachable_rephraser_keeps_local_text() {
        let dispatcher = with_client(ScriptedClient::new().hanging());
        let draft = dispatcher
            .dispatch(Category::Support, &query("How do I cancel my subscription?"))
            .await
            .expect("draft");

        assert!(draft.text.starts_with("You can cancel"));
        assert!(draft.notes.iter().any(|note| note.contains("timed out")));
    }
}
