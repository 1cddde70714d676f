//! Three-step token creation wizard: details, supply and media, review.
//!
//! The controller owns the [`TokenDraft`] for one session. Submission runs
//! publish, build, sign and send, then confirmation strictly in sequence;
//! only one submission may be in flight at a time. Closing the wizard starts
//! a new session, and a submission belonging to an older session never writes
//! its outcome back.

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, warn};

use crate::{
    client::{ChainRpc, WalletAdapter},
    core::{
        DraftField, ErrorKind, MintResult, SdkError, SdkResult, TokenDraft, WizardStep,
        DEFAULT_MAX_FILE_BYTES,
    },
    instructions::TokenInstructionBuilder,
    math::to_base_units,
    notify::{Notice, NotificationCenter},
    pinning::{MediaUploader, MetadataPublisher, PinningService},
};

/// Read-only view of the draft shown on the review step
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReviewSummary {
    pub name: String,
    pub symbol: String,
    pub description: String,
    pub image: String,
    pub decimals: u8,
    /// Supply as entered, in whole tokens
    pub amount: String,
    /// Supply that will be minted, in base units
    pub base_units: u64,
}

struct WizardState {
    step: WizardStep,
    draft: TokenDraft,
    result: Option<MintResult>,
}

impl WizardState {
    fn fresh() -> Self {
        Self {
            step: WizardStep::Details,
            draft: TokenDraft::default(),
            result: None,
        }
    }
}

/// Clears an in-flight flag when the guarded work ends, however it ends
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool, busy: impl FnOnce() -> SdkError) -> SdkResult<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| busy())?;
        Ok(Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct WizardController {
    rpc: Arc<dyn ChainRpc>,
    wallet: Arc<dyn WalletAdapter>,
    uploader: MediaUploader,
    publisher: MetadataPublisher,
    builder: TokenInstructionBuilder,
    notifications: Arc<NotificationCenter>,
    state: Mutex<WizardState>,
    session: AtomicU64,
    submitting: AtomicBool,
    uploading: AtomicBool,
}

impl WizardController {
    pub fn new(
        rpc: Arc<dyn ChainRpc>,
        wallet: Arc<dyn WalletAdapter>,
        pinning: Arc<dyn PinningService>,
        notifications: Arc<NotificationCenter>,
    ) -> Self {
        Self {
            rpc,
            wallet,
            uploader: MediaUploader::new(pinning.clone(), DEFAULT_MAX_FILE_BYTES),
            publisher: MetadataPublisher::new(pinning),
            builder: TokenInstructionBuilder::new(),
            notifications,
            state: Mutex::new(WizardState::fresh()),
            session: AtomicU64::new(0),
            submitting: AtomicBool::new(false),
            uploading: AtomicBool::new(false),
        }
    }

    pub fn with_max_file_bytes(mut self, max_file_bytes: u64) -> Self {
        self.uploader = self.uploader.with_max_file_bytes(max_file_bytes);
        self
    }

    pub fn step(&self) -> WizardStep {
        self.lock().step
    }

    pub fn draft(&self) -> TokenDraft {
        self.lock().draft.clone()
    }

    pub fn result(&self) -> Option<MintResult> {
        self.lock().result.clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading.load(Ordering::SeqCst)
    }

    /// Update one field of the draft
    pub fn set_field(&self, field: DraftField, value: impl Into<String>) -> SdkResult<()> {
        let mut state = self.lock();
        Self::ensure_editable(&state)?;
        if self.is_submitting() {
            return Err(SdkError::InvalidState(
                "draft is locked while submitting".to_string(),
            ));
        }
        state.draft.set(field, value);
        Ok(())
    }

    /// Whether the current step's guard passes
    pub fn can_advance(&self) -> bool {
        let state = self.lock();
        match state.step {
            WizardStep::Details => state.draft.validate_details().is_ok(),
            WizardStep::SupplyMedia => state.draft.validate_supply_media().is_ok(),
            WizardStep::Review | WizardStep::Completed => false,
        }
    }

    /// Move forward one step if the current step is complete
    pub fn next(&self) -> SdkResult<WizardStep> {
        let mut state = self.lock();
        let next = match state.step {
            WizardStep::Details => {
                state.draft.validate_details()?;
                WizardStep::SupplyMedia
            }
            WizardStep::SupplyMedia => {
                state.draft.validate_supply_media()?;
                WizardStep::Review
            }
            WizardStep::Review => {
                return Err(SdkError::InvalidState(
                    "review is the last step, submit to continue".to_string(),
                ))
            }
            WizardStep::Completed => {
                return Err(SdkError::InvalidState("wizard already completed".to_string()))
            }
        };
        debug!(from = ?state.step, to = ?next, "Wizard advanced");
        state.step = next;
        Ok(next)
    }

    /// Move back one step; a no-op on the first step
    pub fn back(&self) -> SdkResult<WizardStep> {
        let mut state = self.lock();
        if self.is_submitting() {
            return Err(SdkError::InvalidState(
                "cannot navigate while submitting".to_string(),
            ));
        }
        state.step = match state.step {
            WizardStep::Details => WizardStep::Details,
            WizardStep::SupplyMedia => WizardStep::Details,
            WizardStep::Review => WizardStep::SupplyMedia,
            WizardStep::Completed => {
                return Err(SdkError::InvalidState(
                    "token already created, start over instead".to_string(),
                ))
            }
        };
        Ok(state.step)
    }

    pub fn review(&self) -> SdkResult<ReviewSummary> {
        let draft = {
            let state = self.lock();
            if state.step != WizardStep::Review {
                return Err(SdkError::InvalidState(format!(
                    "review is not available from {:?}",
                    state.step
                )));
            }
            state.draft.clone()
        };
        let decimals = draft.parsed_decimals()?;
        Ok(ReviewSummary {
            base_units: to_base_units(&draft.amount, decimals)?,
            name: draft.name,
            symbol: draft.symbol,
            description: draft.description,
            image: draft.image,
            decimals,
            amount: draft.amount,
        })
    }

    /// Upload an image and store its URL in the draft.
    ///
    /// On failure the previous image stays in place and a notification is
    /// posted. Refused while a submission or another upload is in flight.
    pub async fn upload_image(&self, file_name: &str, bytes: Vec<u8>) -> SdkResult<String> {
        let (_uploading, session) = self.begin_upload()?;
        let result = self.uploader.upload(file_name, bytes).await;
        self.finish_upload(session, result)
    }

    pub async fn upload_image_path(&self, path: &Path) -> SdkResult<String> {
        let (_uploading, session) = self.begin_upload()?;
        let result = self.uploader.upload_path(path).await;
        self.finish_upload(session, result)
    }

    fn begin_upload(&self) -> SdkResult<(InFlight<'_>, u64)> {
        let guard = InFlight::acquire(&self.uploading, || {
            SdkError::InvalidState("an image upload is already in progress".to_string())
        })?;
        let state = self.lock();
        Self::ensure_editable(&state)?;
        // Pairs with the upload check in `submit`: one of the two always sees the other
        if self.is_submitting() {
            return Err(SdkError::InvalidState(
                "draft is locked while submitting".to_string(),
            ));
        }
        Ok((guard, self.session.load(Ordering::Acquire)))
    }

    fn finish_upload(&self, session: u64, result: SdkResult<String>) -> SdkResult<String> {
        match result {
            Ok(url) => {
                let mut state = self.lock();
                if self.session.load(Ordering::Acquire) != session {
                    info!(%url, "Wizard closed during upload, image discarded");
                    return Err(SdkError::Cancelled);
                }
                state.draft.image = url.clone();
                Ok(url)
            }
            Err(e) => {
                self.notifications.notify_error(&e);
                Err(e)
            }
        }
    }

    /// Publish metadata, build, sign, send and confirm the create-token
    /// transaction. Reaches [`WizardStep::Completed`] only after confirmation.
    ///
    /// Any failure leaves the wizard on the review step with the draft intact
    /// and posts one notification. Validation failures are returned without a
    /// notification.
    pub async fn submit(&self) -> SdkResult<MintResult> {
        let _in_flight = InFlight::acquire(&self.submitting, || SdkError::SubmissionInFlight)?;
        if self.is_uploading() {
            return Err(SdkError::InvalidState(
                "wait for the image upload to finish".to_string(),
            ));
        }

        let (session, draft) = {
            let state = self.lock();
            if state.step != WizardStep::Review {
                return Err(SdkError::InvalidState(format!(
                    "cannot submit from {:?}",
                    state.step
                )));
            }
            (self.session.load(Ordering::Acquire), state.draft.clone())
        };

        match self.run_submission(session, &draft).await {
            Ok(result) => {
                let mut state = self.lock();
                if self.session.load(Ordering::Acquire) != session {
                    warn!(
                        mint = %result.mint_address,
                        signature = %result.transaction_signature,
                        "Token created after the wizard was closed, result not applied"
                    );
                    return Err(SdkError::Cancelled);
                }
                state.step = WizardStep::Completed;
                state.result = Some(result.clone());
                drop(state);

                info!(
                    mint = %result.mint_address,
                    signature = %result.transaction_signature,
                    "Token created"
                );
                self.notifications.notify(
                    Notice::success("Token created successfully!")
                        .with_description(format!("Mint address: {}", result.mint_address))
                        .with_txid(result.transaction_signature),
                );
                Ok(result)
            }
            Err(SdkError::Cancelled) => {
                info!("Submission cancelled");
                Err(SdkError::Cancelled)
            }
            Err(e) => {
                warn!(error = %e, "Token creation failed");
                if e.kind() != ErrorKind::Validation {
                    self.notifications.notify_error(&e);
                }
                Err(e)
            }
        }
    }

    async fn run_submission(&self, session: u64, draft: &TokenDraft) -> SdkResult<MintResult> {
        let payer = self
            .wallet
            .public_key()
            .ok_or_else(|| SdkError::Wallet("Wallet not connected!".to_string()))?;
        // Length and scaling errors surface before anything is pinned
        draft.validate_for_submission()?;
        to_base_units(&draft.amount, draft.parsed_decimals()?)?;

        let metadata_uri = self.publisher.publish(draft).await?;
        self.ensure_session(session)?;

        let prepared = self
            .builder
            .prepare_create_token(self.rpc.as_ref(), draft, &metadata_uri, &payer)
            .await?;
        self.ensure_session(session)?;

        let blockhash = self
            .rpc
            .latest_blockhash()
            .await
            .map_err(|e| SdkError::Build(format!("Failed to fetch blockhash: {}", e)))?;
        let transaction = prepared.to_transaction(blockhash.blockhash)?;
        self.ensure_session(session)?;

        let signature = self
            .wallet
            .sign_and_send_transaction(transaction, self.rpc.as_ref())
            .await?;
        debug!(%signature, mint = %prepared.mint_address(), "Create-token transaction sent");
        self.rpc.confirm_transaction(&signature, &blockhash).await?;

        Ok(MintResult {
            mint_address: prepared.mint_address(),
            transaction_signature: signature,
            associated_token_account: prepared.associated_token_account,
            metadata_account: prepared.metadata_account,
            metadata_uri,
            base_units: prepared.base_units,
        })
    }

    /// Start over with an empty draft after a token was created
    pub fn create_another(&self) -> SdkResult<()> {
        if self.step() != WizardStep::Completed {
            return Err(SdkError::InvalidState(
                "no token has been created yet".to_string(),
            ));
        }
        self.restart();
        Ok(())
    }

    /// Close the wizard: discard the draft and abandon any in-flight work
    pub fn close(&self) {
        self.restart();
        info!("Wizard closed");
    }

    fn restart(&self) {
        let mut state = self.lock();
        self.session.fetch_add(1, Ordering::AcqRel);
        *state = WizardState::fresh();
    }

    fn ensure_session(&self, session: u64) -> SdkResult<()> {
        if self.session.load(Ordering::Acquire) != session {
            return Err(SdkError::Cancelled);
        }
        Ok(())
    }

    fn ensure_editable(state: &WizardState) -> SdkResult<()> {
        if state.step == WizardStep::Completed {
            return Err(SdkError::InvalidState(
                "token already created, start over to edit".to_string(),
            ));
        }
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, WizardState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::KeypairWallet;
    use crate::testing::{MockChain, MockPinning};
    use solana_sdk::signature::Keypair;
    use std::time::Duration;

    fn wizard() -> (WizardController, Arc<MockPinning>, Arc<NotificationCenter>) {
        wizard_on(Arc::new(MockChain::new()))
    }

    fn wizard_on(
        chain: Arc<MockChain>,
    ) -> (WizardController, Arc<MockPinning>, Arc<NotificationCenter>) {
        let pinning = Arc::new(MockPinning::new());
        let notifications = Arc::new(NotificationCenter::new());
        let controller = WizardController::new(
            chain,
            Arc::new(KeypairWallet::new(Keypair::new())),
            pinning.clone(),
            notifications.clone(),
        );
        (controller, pinning, notifications)
    }

    fn fill_to_review(w: &WizardController) {
        w.set_field(DraftField::Name, "Test").unwrap();
        w.set_field(DraftField::Symbol, "TST").unwrap();
        w.set_field(DraftField::Description, "x").unwrap();
        w.next().unwrap();
        w.set_field(DraftField::Amount, "100").unwrap();
        w.set_field(DraftField::Image, "https://gw/x.png").unwrap();
        w.next().unwrap();
    }

    #[test]
    fn test_details_guard() {
        let (w, _, notifications) = wizard();
        w.set_field(DraftField::Name, "Test").unwrap();
        w.set_field(DraftField::Symbol, "TST").unwrap();
        assert!(!w.can_advance());
        assert!(matches!(w.next(), Err(SdkError::Validation(_))));
        assert_eq!(w.step(), WizardStep::Details);

        w.set_field(DraftField::Description, "x").unwrap();
        assert_eq!(w.next().unwrap(), WizardStep::SupplyMedia);
        assert!(notifications.all().is_empty());
    }

    #[test]
    fn test_back_navigation() {
        let (w, _, _) = wizard();
        assert_eq!(w.back().unwrap(), WizardStep::Details);
        w.set_field(DraftField::Name, "Test").unwrap();
        w.set_field(DraftField::Symbol, "TST").unwrap();
        w.set_field(DraftField::Description, "x").unwrap();
        w.next().unwrap();
        assert_eq!(w.back().unwrap(), WizardStep::Details);
        assert_eq!(w.draft().name, "Test");
    }

    #[test]
    fn test_supply_guard_needs_image() {
        let (w, _, _) = wizard();
        w.set_field(DraftField::Name, "Test").unwrap();
        w.set_field(DraftField::Symbol, "TST").unwrap();
        w.set_field(DraftField::Description, "x").unwrap();
        w.next().unwrap();
        w.set_field(DraftField::Amount, "100").unwrap();
        assert!(w.next().is_err());

        w.set_field(DraftField::Image, "https://gw/x.png").unwrap();
        assert_eq!(w.next().unwrap(), WizardStep::Review);
        let summary = w.review().unwrap();
        assert_eq!(summary.decimals, 9);
        assert_eq!(summary.base_units, 100_000_000_000);
    }

    #[tokio::test]
    async fn test_failed_upload_keeps_previous_image() {
        let (w, pinning, notifications) = wizard();
        let first = w.upload_image("logo.png", vec![1, 2, 3]).await.unwrap();
        assert_eq!(w.draft().image, first);

        pinning.fail_files(true);
        assert!(matches!(
            w.upload_image("logo2.png", vec![4, 5, 6]).await,
            Err(SdkError::Upload(_))
        ));
        assert_eq!(w.draft().image, first);
        assert_eq!(notifications.all().len(), 1);
    }

    #[tokio::test]
    async fn test_submit_outside_review_is_rejected() {
        let (w, pinning, _) = wizard();
        assert!(matches!(w.submit().await, Err(SdkError::InvalidState(_))));
        assert_eq!(pinning.json_calls(), 0);
        assert!(!w.is_submitting());
    }

    #[test]
    fn test_details_guard_refuses_oversized_name() {
        let (w, pinning, notifications) = wizard();
        w.set_field(DraftField::Name, "A".repeat(33)).unwrap();
        w.set_field(DraftField::Symbol, "TST").unwrap();
        w.set_field(DraftField::Description, "x").unwrap();
        assert!(!w.can_advance());
        assert!(matches!(w.next(), Err(SdkError::Validation(_))));
        assert_eq!(w.step(), WizardStep::Details);
        assert_eq!(pinning.json_calls(), 0);
        assert!(notifications.all().is_empty());
    }

    #[tokio::test]
    async fn test_oversized_symbol_on_review_fails_before_pinning() {
        let chain = Arc::new(MockChain::new());
        let (w, pinning, _) = wizard_on(chain.clone());
        fill_to_review(&w);
        w.set_field(DraftField::Symbol, "ELEVENCHARS").unwrap();

        let err = w.submit().await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid input: symbol is 11 bytes, at most 10 allowed");
        assert_eq!(pinning.json_calls(), 0);
        assert!(chain.calls().is_empty());
        assert_eq!(w.step(), WizardStep::Review);
    }

    #[tokio::test]
    async fn test_upload_refused_while_submitting() {
        let chain = Arc::new(MockChain::new());
        chain.set_send_delay(Duration::from_millis(200));
        let (w, pinning, _) = wizard_on(chain);
        fill_to_review(&w);

        let (submitted, uploaded) = tokio::join!(w.submit(), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            w.upload_image("new.png", vec![1, 2, 3]).await
        });

        assert!(submitted.is_ok());
        assert!(matches!(uploaded, Err(SdkError::InvalidState(_))));
        assert_eq!(pinning.file_calls(), 0);
        assert_eq!(w.step(), WizardStep::Completed);
        assert_eq!(w.draft().image, "https://gw/x.png");
        assert_eq!(pinning.documents()[0]["image"], "https://gw/x.png");
    }

    #[tokio::test]
    async fn test_only_one_upload_at_a_time() {
        let (w, pinning, notifications) = wizard();
        pinning.set_file_delay(Duration::from_millis(100));

        let (first, second) = tokio::join!(w.upload_image("a.png", vec![1]), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            w.upload_image("b.png", vec![2]).await
        });

        let first = first.unwrap();
        assert!(matches!(second, Err(SdkError::InvalidState(_))));
        assert_eq!(pinning.file_calls(), 1);
        assert_eq!(w.draft().image, first);
        assert!(!w.is_uploading());
        assert!(notifications.all().is_empty());
    }

    #[tokio::test]
    async fn test_submit_refused_during_upload() {
        let (w, pinning, _) = wizard();
        fill_to_review(&w);
        pinning.set_file_delay(Duration::from_millis(100));

        let (uploaded, submitted) = tokio::join!(w.upload_image("new.png", vec![1]), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            w.submit().await
        });

        let url = uploaded.unwrap();
        assert!(matches!(submitted, Err(SdkError::InvalidState(_))));
        assert_eq!(pinning.json_calls(), 0);
        assert!(!w.is_submitting());
        assert_eq!(w.step(), WizardStep::Review);

        let result = w.submit().await.unwrap();
        assert_eq!(pinning.documents()[0]["image"], url.as_str());
        assert_eq!(result.metadata_uri, "https://gateway.test/ipfs/json-1");
    }
}
