//! The analysis workflow state machine.
//!
//! The intake flow is step-gated: a client must be selected before a
//! sample can be analyzed, script scores must exist before questionnaire
//! scores, and the weight only produces a combined map once both source
//! maps are present. The gating is an explicit state machine so the valid
//! combinations of present/absent maps are unambiguous.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::scores::{combine, ScoreMap, Weight};
use crate::types::{ClientPatch, ClientRecord};

/// Stage of an analysis session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AnalysisStage {
    /// No client selected; nothing can be recorded.
    #[default]
    NoClient,
    /// Client selected, waiting for a handwriting sample.
    AwaitingSample,
    /// Script scores present, waiting for questionnaire scores.
    AwaitingQuestionnaire,
    /// Both source maps present; a combined map exists and weight changes
    /// recompute it.
    Combined,
}

/// Stages reachable from `from`.
pub fn allowed_transitions(from: AnalysisStage) -> Vec<AnalysisStage> {
    use AnalysisStage::*;
    match from {
        NoClient => vec![AwaitingSample, AwaitingQuestionnaire, Combined],
        AwaitingSample => vec![AwaitingQuestionnaire, NoClient],
        // A re-upload replaces the sample and folds the session back to
        // the questionnaire step.
        AwaitingQuestionnaire => vec![AwaitingQuestionnaire, Combined, NoClient],
        Combined => vec![Combined, AwaitingQuestionnaire, NoClient],
    }
}

/// Validates a stage transition.
pub fn validate_transition(from: AnalysisStage, to: AnalysisStage) -> Result<(), CoreError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(CoreError::IllegalTransition { from, to })
    }
}

/// Outcome of a state-changing workflow operation.
///
/// `persist` is the patch the caller should write to the remote store,
/// best-effort: a failed write surfaces an error but never rolls the
/// session back.
#[derive(Debug, Clone, PartialEq)]
pub struct StageUpdate {
    pub stage: AnalysisStage,
    pub persist: Option<ClientPatch>,
}

impl StageUpdate {
    fn local(stage: AnalysisStage) -> Self {
        Self {
            stage,
            persist: None,
        }
    }

    fn persisting(stage: AnalysisStage, patch: ClientPatch) -> Self {
        Self {
            stage,
            persist: Some(patch),
        }
    }
}

/// One analysis session: the selected client, the three score maps, and
/// the active weight.
///
/// Local state is the source of truth for the current session; the remote
/// store is kept eventually consistent through the patches each operation
/// reports.
#[derive(Debug, Clone, Default)]
pub struct AnalysisSession {
    stage: AnalysisStage,
    client: Option<ClientRecord>,
    script_scores: Option<ScoreMap>,
    questionnaire_scores: Option<ScoreMap>,
    combined_scores: Option<ScoreMap>,
    weight: Weight,
}

impl AnalysisSession {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn stage(&self) -> AnalysisStage {
        self.stage
    }

    #[inline]
    #[must_use]
    pub fn client(&self) -> Option<&ClientRecord> {
        self.client.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn script_scores(&self) -> Option<&ScoreMap> {
        self.script_scores.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn questionnaire_scores(&self) -> Option<&ScoreMap> {
        self.questionnaire_scores.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn combined_scores(&self) -> Option<&ScoreMap> {
        self.combined_scores.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn weight(&self) -> Weight {
        self.weight
    }

    /// Select a client and resume whatever state its record carries.
    ///
    /// A record with stored script scores skips straight past the sample
    /// step; one with both maps resumes at the combined stage. A stored
    /// combined map is trusted as-is; if the record carries both source
    /// maps but no combined map, it is recomputed here.
    pub fn select_client(&mut self, record: ClientRecord) -> StageUpdate {
        self.script_scores = record.script_scores.clone();
        self.questionnaire_scores = record.questionnaire_scores.clone();
        self.weight = record.weight.unwrap_or_default();

        self.combined_scores = match (&record.combined_scores, &self.script_scores) {
            (Some(combined), _) => Some(combined.clone()),
            (None, Some(script)) => self
                .questionnaire_scores
                .as_ref()
                .map(|questionnaire| combine(script, questionnaire, self.weight)),
            (None, None) => None,
        };

        let stage = match (&self.script_scores, &self.questionnaire_scores) {
            (Some(_), Some(_)) => AnalysisStage::Combined,
            (Some(_), None) => AnalysisStage::AwaitingQuestionnaire,
            _ => AnalysisStage::AwaitingSample,
        };

        tracing::debug!(client = %record.id, stage = ?stage, "client selected");
        self.client = Some(record);
        self.stage = stage;
        StageUpdate::local(stage)
    }

    /// Drop the selected client and all session state.
    pub fn deselect(&mut self) -> StageUpdate {
        *self = Self::new();
        StageUpdate::local(AnalysisStage::NoClient)
    }

    /// Record script scores from a completed sample analysis.
    ///
    /// A new sample invalidates any questionnaire and combined maps from a
    /// previous run; the session folds back to the questionnaire step.
    pub fn record_script_scores(&mut self, scores: ScoreMap) -> Result<StageUpdate, CoreError> {
        if self.client.is_none() {
            return Err(CoreError::NoClientSelected);
        }
        validate_transition(self.stage(), AnalysisStage::AwaitingQuestionnaire)?;

        self.script_scores = Some(scores.clone());
        self.questionnaire_scores = None;
        self.combined_scores = None;
        self.stage = AnalysisStage::AwaitingQuestionnaire;

        Ok(StageUpdate::persisting(
            self.stage(),
            ClientPatch::new().with_script_scores(scores),
        ))
    }

    /// Record questionnaire scores and compute the combined map.
    ///
    /// This is the first of the two recompute triggers; the patch carries
    /// the questionnaire map, the derived combined map, and the weight it
    /// was computed under.
    pub fn record_questionnaire_scores(
        &mut self,
        scores: ScoreMap,
    ) -> Result<StageUpdate, CoreError> {
        if self.client.is_none() {
            return Err(CoreError::NoClientSelected);
        }
        let script = self
            .script_scores
            .as_ref()
            .ok_or(CoreError::ScriptScoresMissing)?;
        validate_transition(self.stage(), AnalysisStage::Combined)?;

        let combined = combine(script, &scores, self.weight);
        self.questionnaire_scores = Some(scores.clone());
        self.combined_scores = Some(combined.clone());
        self.stage = AnalysisStage::Combined;

        Ok(StageUpdate::persisting(
            self.stage(),
            ClientPatch::new()
                .with_questionnaire_scores(scores)
                .with_combined_scores(combined)
                .with_weight(self.weight),
        ))
    }

    /// Change the blend weight.
    ///
    /// While both source maps exist this recomputes the combined map and
    /// reports a patch; in earlier stages the weight is stored for later
    /// and nothing needs persisting.
    pub fn set_weight(&mut self, weight: Weight) -> StageUpdate {
        self.weight = weight;

        match (&self.script_scores, &self.questionnaire_scores) {
            (Some(script), Some(questionnaire)) => {
                let combined = combine(script, questionnaire, weight);
                self.combined_scores = Some(combined.clone());
                self.stage = AnalysisStage::Combined;
                StageUpdate::persisting(
                    self.stage(),
                    ClientPatch::new()
                        .with_weight(weight)
                        .with_combined_scores(combined),
                )
            }
            _ => StageUpdate::local(self.stage()),
        }
    }

    /// Fold in a refreshed record after a successful response poll.
    ///
    /// The remote store already holds this state, so nothing needs
    /// persisting; the session adopts the questionnaire and combined maps
    /// (recomputing the latter if the server omitted it).
    pub fn sync_responses(&mut self, record: ClientRecord) -> Result<StageUpdate, CoreError> {
        if self.client.is_none() {
            return Err(CoreError::NoClientSelected);
        }
        let questionnaire = record
            .questionnaire_scores
            .clone()
            .ok_or(CoreError::MissingField("questionnaireScores"))?;
        let script = self
            .script_scores
            .as_ref()
            .ok_or(CoreError::ScriptScoresMissing)?;
        validate_transition(self.stage(), AnalysisStage::Combined)?;

        if let Some(weight) = record.weight {
            self.weight = weight;
        }
        let combined = record
            .combined_scores
            .clone()
            .unwrap_or_else(|| combine(script, &questionnaire, self.weight));

        self.questionnaire_scores = Some(questionnaire);
        self.combined_scores = Some(combined);
        self.client = Some(record);
        self.stage = AnalysisStage::Combined;
        Ok(StageUpdate::local(self.stage()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ClientId;

    fn client() -> ClientRecord {
        ClientRecord::new(ClientId::new("c1"), "Ada", "ada@example.com")
    }

    fn script_map() -> ScoreMap {
        ScoreMap::from_pairs([("A", 80.0), ("B", 60.0), ("C", 40.0), ("D", 20.0)])
    }

    fn questionnaire_map() -> ScoreMap {
        ScoreMap::from_pairs([("A", 40.0), ("B", 60.0), ("C", 80.0), ("D", 100.0)])
    }

    #[test]
    fn full_flow_reaches_combined() {
        let mut session = AnalysisSession::new();
        assert_eq!(session.stage(), AnalysisStage::NoClient);

        session.select_client(client());
        assert_eq!(session.stage(), AnalysisStage::AwaitingSample);

        let update = session.record_script_scores(script_map()).unwrap();
        assert_eq!(update.stage, AnalysisStage::AwaitingQuestionnaire);
        assert!(update.persist.unwrap().script_scores.is_some());

        let update = session
            .record_questionnaire_scores(questionnaire_map())
            .unwrap();
        assert_eq!(update.stage, AnalysisStage::Combined);
        let patch = update.persist.unwrap();
        assert!(patch.questionnaire_scores.is_some());
        assert_eq!(
            patch.combined_scores.unwrap().get("A"),
            Some(60.0)
        );
    }

    #[test]
    fn questionnaire_before_sample_is_rejected() {
        let mut session = AnalysisSession::new();
        session.select_client(client());
        let err = session
            .record_questionnaire_scores(questionnaire_map())
            .unwrap_err();
        assert_eq!(err, CoreError::ScriptScoresMissing);
    }

    #[test]
    fn operations_require_a_client() {
        let mut session = AnalysisSession::new();
        assert_eq!(
            session.record_script_scores(script_map()).unwrap_err(),
            CoreError::NoClientSelected
        );
    }

    #[test]
    fn weight_change_before_questionnaire_persists_nothing() {
        let mut session = AnalysisSession::new();
        session.select_client(client());
        session.record_script_scores(script_map()).unwrap();

        let update = session.set_weight(Weight::new(80).unwrap());
        assert_eq!(update.stage, AnalysisStage::AwaitingQuestionnaire);
        assert!(update.persist.is_none());
        assert!(session.combined_scores().is_none());
    }

    #[test]
    fn weight_change_in_combined_recomputes() {
        let mut session = AnalysisSession::new();
        session.select_client(client());
        session.record_script_scores(script_map()).unwrap();
        session
            .record_questionnaire_scores(questionnaire_map())
            .unwrap();

        let update = session.set_weight(Weight::new(100).unwrap());
        assert_eq!(update.stage, AnalysisStage::Combined);
        let patch = update.persist.unwrap();
        assert_eq!(patch.combined_scores.unwrap().get("A"), Some(80.0));
        assert_eq!(session.combined_scores().unwrap().get("D"), Some(20.0));
    }

    #[test]
    fn reupload_resets_questionnaire_and_combined() {
        let mut session = AnalysisSession::new();
        session.select_client(client());
        session.record_script_scores(script_map()).unwrap();
        session
            .record_questionnaire_scores(questionnaire_map())
            .unwrap();

        let update = session
            .record_script_scores(ScoreMap::from_pairs([("A", 10.0)]))
            .unwrap();
        assert_eq!(update.stage, AnalysisStage::AwaitingQuestionnaire);
        assert!(session.questionnaire_scores().is_none());
        assert!(session.combined_scores().is_none());
    }

    #[test]
    fn selecting_completed_client_resumes_combined() {
        let mut record = client();
        record.script_scores = Some(script_map());
        record.questionnaire_scores = Some(questionnaire_map());
        record.weight = Some(Weight::new(50).unwrap());

        let mut session = AnalysisSession::new();
        let update = session.select_client(record);
        assert_eq!(update.stage, AnalysisStage::Combined);
        // Combined map was absent from the record and recomputed here.
        assert_eq!(session.combined_scores().unwrap().get("B"), Some(60.0));
    }

    #[test]
    fn sync_responses_adopts_server_state() {
        let mut session = AnalysisSession::new();
        session.select_client(client());
        session.record_script_scores(script_map()).unwrap();

        let mut refreshed = client();
        refreshed.script_scores = Some(script_map());
        refreshed.questionnaire_scores = Some(questionnaire_map());
        refreshed.weight = Some(Weight::new(0).unwrap());

        let update = session.sync_responses(refreshed).unwrap();
        assert_eq!(update.stage, AnalysisStage::Combined);
        assert!(update.persist.is_none());
        // w=0 means the combined map mirrors the questionnaire.
        assert_eq!(session.combined_scores().unwrap().get("D"), Some(100.0));
    }

    #[test]
    fn deselect_clears_everything() {
        let mut session = AnalysisSession::new();
        session.select_client(client());
        session.record_script_scores(script_map()).unwrap();

        let update = session.deselect();
        assert_eq!(update.stage, AnalysisStage::NoClient);
        assert!(update.persist.is_none());
        assert!(session.client().is_none());
        assert!(session.script_scores().is_none());
        assert_eq!(session.weight(), Weight::default());
    }

    #[test]
    fn transition_table_matches_gating() {
        use AnalysisStage::*;
        assert!(validate_transition(NoClient, AwaitingSample).is_ok());
        assert!(validate_transition(AwaitingSample, Combined).is_err());
        assert!(validate_transition(Combined, Combined).is_ok());
        assert!(validate_transition(Combined, AwaitingSample).is_err());
        assert!(validate_transition(AwaitingQuestionnaire, NoClient).is_ok());
    }
}
