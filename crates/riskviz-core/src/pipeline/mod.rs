//! The agent query pipeline.
//!
//! Turns one natural-language question into one assistant message by calling
//! the translate, execute, and explain endpoints in strict sequence, with a
//! single bounded auto-recovery when Execute reports that no workbook is
//! loaded. The conversation log is the only shared mutable resource; runs are
//! serialized by a run lock so each user/assistant pair stays contiguous.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::agent::{AgentBackend, Explanation};
use crate::conversation::{ConversationLog, ConversationRepository, Message};
use crate::error::{Result, RiskvizError};
use crate::notify::Notifier;
use crate::workbook::{self, WorkbookBackend, WorkbookSheet};


/// Case-insensitive substring marking the one recoverable Execute failure.
const NO_WORKBOOK_SIGNATURE: &str = "no workbook loaded";

/// Assistant-message content when a terminal failure carries no detail.
const PIPELINE_ERROR_FALLBACK: &str = "Agent pipeline error. Please try again.";

/// Transient-notification text when a terminal failure carries no detail.
const AGENT_FAILED_FALLBACK: &str = "Agent failed";

/// Recovery attempts allowed per submitted question.
const RETRY_BUDGET: u8 = 1;

/// Where the pipeline currently is within a run.
///
/// `Idle` is both the initial and the terminal phase of every run:
/// `Idle -> Translating -> Executing -> (Explaining | Recovering ->
/// Translating -> Executing -> Explaining) -> Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPhase {
    #[default]
    Idle,
    Translating,
    Executing,
    Recovering,
    Explaining,
}

/// Which stage a failure came from. Recovery is keyed off `Execute` only;
/// Translate and Explain failures are always terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Translate,
    Execute,
    Explain,
}

struct StageFailure {
    stage: Stage,
    error: RiskvizError,
}

impl StageFailure {
    fn is_recoverable(&self) -> bool {
        self.stage == Stage::Execute
            && self
                .error
                .detail()
                .map(|detail| detail.to_lowercase().contains(NO_WORKBOOK_SIGNATURE))
                .unwrap_or(false)
    }
}

/// Orchestrates agent runs and owns the conversation log.
///
/// All collaborators are injected as trait objects so the pipeline can be
/// exercised against in-memory fakes.
pub struct AgentPipeline {
    agent: Arc<dyn AgentBackend>,
    workbook: Arc<dyn WorkbookBackend>,
    repository: Arc<dyn ConversationRepository>,
    notifier: Arc<dyn Notifier>,
    /// In-memory conversation log; persisted write-through on every append.
    log: RwLock<ConversationLog>,
    /// Serializes runs (and clears) against the log.
    run_lock: Mutex<()>,
    phase: RwLock<RunPhase>,
    /// Explicit user selection; overrides the default-sheet heuristic.
    selected_sheet: RwLock<Option<String>>,
    /// Cached sheet list, invalidated by recovery and `load_example`.
    sheets: RwLock<Option<Vec<WorkbookSheet>>>,
    /// Raw result payload of the most recent run, kept for downstream reuse.
    last_result: RwLock<Option<Value>>,
}

impl AgentPipeline {
    /// Creates a pipeline with an empty log. Call [`load`](Self::load) to
    /// restore the persisted conversation.
    pub fn new(
        agent: Arc<dyn AgentBackend>,
        workbook: Arc<dyn WorkbookBackend>,
        repository: Arc<dyn ConversationRepository>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            agent,
            workbook,
            repository,
            notifier,
            log: RwLock::new(ConversationLog::new()),
            run_lock: Mutex::new(()),
            phase: RwLock::new(RunPhase::Idle),
            selected_sheet: RwLock::new(None),
            sheets: RwLock::new(None),
            last_result: RwLock::new(None),
        }
    }

    /// Restores the conversation log from the repository.
    ///
    /// An absent or malformed slot yields an empty log (the repository
    /// contract); only storage-level failures propagate.
    pub async fn load(&self) -> Result<()> {
        let messages = self.repository.load().await?;
        let mut log = self.log.write().await;
        *log = ConversationLog::from_messages(messages);
        Ok(())
    }

    /// A snapshot of the ordered conversation messages.
    pub async fn messages(&self) -> Vec<Message> {
        self.log.read().await.messages().to_vec()
    }

    /// The pipeline's current run phase.
    pub async fn phase(&self) -> RunPhase {
        *self.phase.read().await
    }

    /// The raw result payload of the most recent run, if any.
    pub async fn last_result(&self) -> Option<Value> {
        self.last_result.read().await.clone()
    }

    /// Pins the target sheet, or reverts to the default heuristic on `None`.
    pub async fn select_sheet(&self, name: Option<String>) {
        *self.selected_sheet.write().await = name;
    }

    /// Fetches the sheet list from the workbook service and refreshes the
    /// cache.
    pub async fn refresh_sheets(&self) -> Result<Vec<WorkbookSheet>> {
        let sheets = self.workbook.list_sheets().await?;
        *self.sheets.write().await = Some(sheets.clone());
        Ok(sheets)
    }

    /// Loads the bundled example workbook and refreshes the sheet cache.
    pub async fn load_example(&self) -> Result<()> {
        match self.bootstrap_example().await {
            Ok(()) => {
                self.notifier.success("Example workbook loaded");
                Ok(())
            }
            Err(err) => {
                self.notifier.error("Failed to load example");
                Err(err)
            }
        }
    }

    /// Clears the conversation: empties the in-memory log, drops the retained
    /// result payload, and removes the persisted slot entirely.
    pub async fn clear(&self) -> Result<()> {
        let _run = self.run_lock.lock().await;

        self.log.write().await.clear();
        *self.last_result.write().await = None;
        self.repository.clear().await?;
        self.notifier.success("Conversation cleared");
        Ok(())
    }

    /// Submits one question and drives it to a terminal outcome.
    ///
    /// Appends exactly one user message (synchronously, before any network
    /// call) and exactly one assistant message (the explanation on success,
    /// the backend detail or a generic fallback on failure), then returns the
    /// pipeline to `Idle`. Returns the appended assistant message, or `None`
    /// when the submission was ignored (empty question, no resolvable sheet).
    pub async fn submit_question(&self, question: &str) -> Result<Option<Message>> {
        let question = question.trim();
        if question.is_empty() {
            return Ok(None);
        }

        // Serialize runs so assistant messages land in submission order.
        let _run = self.run_lock.lock().await;

        let Some(mut sheet) = self.resolved_sheet().await else {
            self.notifier.error("Please load a workbook first");
            return Ok(None);
        };

        let run_id = Uuid::new_v4();
        tracing::debug!(%run_id, %sheet, question, "starting agent run");

        self.append(Message::user(question)).await?;

        let mut attempts_remaining = RETRY_BUDGET;
        let outcome = loop {
            match self.run_stages(question, &sheet).await {
                Ok(explanation) => break Ok(explanation),
                Err(failure) => {
                    if attempts_remaining > 0 && failure.is_recoverable() {
                        attempts_remaining -= 1;
                        self.set_phase(RunPhase::Recovering).await;
                        if self.bootstrap_example().await.is_ok() {
                            self.notifier.success("Example workbook loaded, retrying...");
                            if let Some(refreshed) = self.resolved_sheet().await {
                                sheet = refreshed;
                            }
                            continue;
                        }
                        // Bootstrap failed: fall through with the Execute error.
                    }
                    break Err(failure);
                }
            }
        };

        let message = match outcome {
            Ok(explanation) => {
                tracing::debug!(%run_id, "agent run succeeded");
                Message::assistant(explanation.explanation)
            }
            Err(failure) => {
                tracing::debug!(
                    %run_id,
                    stage = ?failure.stage,
                    "agent run failed: {}",
                    failure.error
                );
                let detail = failure.error.detail();
                self.notifier.error(detail.unwrap_or(AGENT_FAILED_FALLBACK));
                Message::assistant(detail.unwrap_or(PIPELINE_ERROR_FALLBACK))
            }
        };

        let appended = self.append(message.clone()).await;
        self.set_phase(RunPhase::Idle).await;
        appended?;

        Ok(Some(message))
    }

    /// Runs the three stages in order, tagging any failure with its stage.
    async fn run_stages(
        &self,
        question: &str,
        sheet: &str,
    ) -> std::result::Result<Explanation, StageFailure> {
        self.set_phase(RunPhase::Translating).await;
        let code = self
            .agent
            .translate(question, Some(sheet))
            .await
            .map_err(|error| StageFailure {
                stage: Stage::Translate,
                error,
            })?;

        self.set_phase(RunPhase::Executing).await;
        let outcome = self
            .agent
            .execute(&code, Some(sheet), Some(question))
            .await
            .map_err(|error| StageFailure {
                stage: Stage::Execute,
                error,
            })?;
        *self.last_result.write().await = Some(outcome.data.clone());

        self.set_phase(RunPhase::Explaining).await;
        self.agent
            .explain(question, &outcome.data, Some(&outcome.meta))
            .await
            .map_err(|error| StageFailure {
                stage: Stage::Explain,
                error,
            })
    }

    /// The explicitly selected sheet, or the default-sheet heuristic over the
    /// available names. `None` means no workbook is resolvable.
    async fn resolved_sheet(&self) -> Option<String> {
        if let Some(sheet) = self.selected_sheet.read().await.clone() {
            return Some(sheet);
        }
        let names = self.sheet_names().await;
        workbook::default_sheet(&names).map(str::to_string)
    }

    /// Cached sheet names, fetching on a cache miss. A failed listing is
    /// treated as "no sheets available", not as a run failure.
    async fn sheet_names(&self) -> Vec<String> {
        if let Some(sheets) = self.sheets.read().await.as_ref() {
            return sheets.iter().map(|s| s.name.clone()).collect();
        }
        match self.refresh_sheets().await {
            Ok(sheets) => sheets.into_iter().map(|s| s.name).collect(),
            Err(err) => {
                tracing::debug!("sheet listing failed: {}", err);
                Vec::new()
            }
        }
    }

    async fn bootstrap_example(&self) -> Result<()> {
        self.workbook.load_example(None).await?;
        self.refresh_sheets().await?;
        Ok(())
    }

    /// Appends to the in-memory log, then write-through persists the full
    /// updated log.
    async fn append(&self, message: Message) -> Result<()> {
        let mut log = self.log.write().await;
        log.append(message);
        self.repository.save(log.messages()).await
    }

    async fn set_phase(&self, phase: RunPhase) {
        *self.phase.write().await = phase;
    }
}
