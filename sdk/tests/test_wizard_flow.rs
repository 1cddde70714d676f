//! End-to-end token creation through the wizard with in-memory collaborators

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::sync::Arc;
    use std::time::Duration;

    use solana_sdk::{pubkey::Pubkey, signature::Keypair, system_program};
    use tokenforge_sdk::{
        core::metadata_program_id,
        testing::{MockChain, MockPinning},
        DraftField, ErrorKind, KeypairWallet, NotificationCenter, NotificationKind, SdkError,
        TokenDraft, WizardController, WizardStep,
    };

    struct Harness {
        chain: Arc<MockChain>,
        pinning: Arc<MockPinning>,
        wallet: Arc<KeypairWallet>,
        notifications: Arc<NotificationCenter>,
        wizard: Arc<WizardController>,
    }

    fn harness() -> Harness {
        let chain = Arc::new(MockChain::new());
        let pinning = Arc::new(MockPinning::new());
        let wallet = Arc::new(KeypairWallet::new(Keypair::new()));
        let notifications = Arc::new(NotificationCenter::new());
        let wizard = Arc::new(WizardController::new(
            chain.clone(),
            wallet.clone(),
            pinning.clone(),
            notifications.clone(),
        ));
        Harness {
            chain,
            pinning,
            wallet,
            notifications,
            wizard,
        }
    }

    /// Fill the sample draft and walk to the review step
    fn to_review(wizard: &WizardController, decimals: &str) {
        wizard.set_field(DraftField::Name, "Test").unwrap();
        wizard.set_field(DraftField::Symbol, "TST").unwrap();
        wizard.set_field(DraftField::Description, "x").unwrap();
        assert_eq!(wizard.next().unwrap(), WizardStep::SupplyMedia);
        wizard
            .set_field(DraftField::Image, "https://gw/x.png")
            .unwrap();
        wizard.set_field(DraftField::Decimals, decimals).unwrap();
        wizard.set_field(DraftField::Amount, "100").unwrap();
        assert_eq!(wizard.next().unwrap(), WizardStep::Review);
    }

    #[tokio::test]
    async fn test_successful_creation_reaches_completed() {
        let h = harness();
        to_review(&h.wizard, "6");

        let result = h.wizard.submit().await.unwrap();
        assert_eq!(h.wizard.step(), WizardStep::Completed);
        assert_eq!(h.wizard.result(), Some(result.clone()));
        assert_eq!(
            Pubkey::from_str(&result.mint_address.to_string()).unwrap(),
            result.mint_address
        );
        assert!(!result.transaction_signature.to_string().is_empty());
        assert_eq!(result.base_units, 100_000_000);
        assert_eq!(result.metadata_uri, "https://gateway.test/ipfs/json-1");

        assert_eq!(
            h.chain.calls(),
            vec![
                "minimum_balance_for_rent_exemption",
                "latest_blockhash",
                "send_transaction",
                "confirm_transaction",
            ],
            "publish, build, send and confirm must run in order"
        );
        assert_eq!(h.pinning.json_calls(), 1);
        assert_eq!(h.pinning.file_calls(), 0);

        let sent = h.chain.sent_transactions();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].verify().is_ok(), "payer and mint must both sign");
        assert_eq!(sent[0].signatures[0], result.transaction_signature);

        let notifications = h.notifications.all();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, NotificationKind::Success);
        assert_eq!(notifications[0].txid, Some(result.transaction_signature));
    }

    #[tokio::test]
    async fn test_sent_instructions_follow_mint_lifecycle() {
        let h = harness();
        to_review(&h.wizard, "9");
        h.wizard.submit().await.unwrap();

        let tx = &h.chain.sent_transactions()[0];
        let programs: Vec<Pubkey> = tx
            .message
            .instructions
            .iter()
            .map(|ix| tx.message.account_keys[ix.program_id_index as usize])
            .collect();
        assert_eq!(
            programs,
            vec![
                system_program::id(),
                spl_token::id(),
                spl_associated_token_account::id(),
                spl_token::id(),
                metadata_program_id(),
            ]
        );
        assert_eq!(tx.message.account_keys[0], h.wallet_key());
    }

    #[tokio::test]
    async fn test_publish_failure_stays_in_review() {
        let h = harness();
        to_review(&h.wizard, "6");
        let before: TokenDraft = h.wizard.draft();
        h.pinning.fail_json(true);

        let err = h.wizard.submit().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Publish);
        assert_eq!(h.wizard.step(), WizardStep::Review);
        assert_eq!(h.wizard.draft(), before);
        assert_eq!(h.chain.call_count(), 0, "no transaction may be built");

        let notifications = h.notifications.all();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, NotificationKind::Error);
        assert_eq!(notifications[0].message, "Metadata upload failed!");
    }

    #[tokio::test]
    async fn test_disconnected_wallet_makes_no_calls() {
        let h = harness();
        to_review(&h.wizard, "6");
        h.wallet.disconnect();

        let err = h.wizard.submit().await.unwrap_err();
        assert!(matches!(err, SdkError::Wallet(_)));
        assert_eq!(h.pinning.json_calls(), 0);
        assert_eq!(h.pinning.file_calls(), 0);
        assert_eq!(h.chain.call_count(), 0);
        assert_eq!(h.notifications.all().len(), 1);
        assert_eq!(h.wizard.step(), WizardStep::Review);
    }

    #[tokio::test]
    async fn test_unscalable_amount_fails_before_publishing() {
        let h = harness();
        to_review(&h.wizard, "255");

        let err = h.wizard.submit().await.unwrap_err();
        assert!(matches!(err, SdkError::Amount(_)));
        assert_eq!(err.kind(), ErrorKind::Build);
        assert_eq!(h.pinning.json_calls(), 0);
        assert_eq!(h.wizard.step(), WizardStep::Review);
    }

    #[tokio::test]
    async fn test_broadcast_failure_reports_signature() {
        let h = harness();
        to_review(&h.wizard, "6");
        h.chain.fail_on("send_transaction");

        let err = h.wizard.submit().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Broadcast);
        assert!(err.signature().is_some());
        assert_eq!(h.wizard.step(), WizardStep::Review);
        assert_eq!(h.notifications.all()[0].txid, err.signature());
    }

    #[tokio::test]
    async fn test_confirmation_failure_keeps_draft() {
        let h = harness();
        to_review(&h.wizard, "6");
        h.chain.fail_on("confirm_transaction");

        let err = h.wizard.submit().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Confirmation);
        assert_eq!(h.wizard.step(), WizardStep::Review);
        assert_eq!(h.wizard.result(), None);
        assert_eq!(h.wizard.draft().name, "Test");
    }

    #[tokio::test]
    async fn test_second_submit_while_in_flight_is_refused() {
        let h = harness();
        to_review(&h.wizard, "6");
        h.chain.set_send_delay(Duration::from_millis(200));

        let first = tokio::spawn({
            let wizard = h.wizard.clone();
            async move { wizard.submit().await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(h.wizard.is_submitting());

        let second = h.wizard.submit().await;
        assert!(matches!(second, Err(SdkError::SubmissionInFlight)));

        assert!(first.await.unwrap().is_ok());
        assert_eq!(h.pinning.json_calls(), 1);
        assert_eq!(h.chain.sent_transactions().len(), 1);
        assert!(!h.wizard.is_submitting());
    }

    #[tokio::test]
    async fn test_closing_discards_late_result() {
        let h = harness();
        to_review(&h.wizard, "6");
        h.chain.set_send_delay(Duration::from_millis(200));

        let pending = tokio::spawn({
            let wizard = h.wizard.clone();
            async move { wizard.submit().await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        h.wizard.close();

        assert!(matches!(pending.await.unwrap(), Err(SdkError::Cancelled)));
        assert_eq!(h.wizard.step(), WizardStep::Details);
        assert_eq!(h.wizard.draft(), TokenDraft::default());
        assert_eq!(h.wizard.result(), None);
        assert!(h.notifications.all().is_empty());
    }

    #[tokio::test]
    async fn test_completed_is_terminal_until_restart() {
        let h = harness();
        to_review(&h.wizard, "6");
        h.wizard.submit().await.unwrap();

        assert!(h.wizard.back().is_err());
        assert!(h.wizard.set_field(DraftField::Name, "Other").is_err());

        h.wizard.create_another().unwrap();
        assert_eq!(h.wizard.step(), WizardStep::Details);
        assert_eq!(h.wizard.draft(), TokenDraft::default());
        assert_eq!(h.wizard.result(), None);
    }

    #[tokio::test]
    async fn test_uploaded_image_feeds_metadata() {
        let h = harness();
        h.wizard.set_field(DraftField::Name, "Test").unwrap();
        h.wizard.set_field(DraftField::Symbol, "TST").unwrap();
        h.wizard.set_field(DraftField::Description, "x").unwrap();
        h.wizard.next().unwrap();

        let url = h
            .wizard
            .upload_image("logo.png", vec![137, 80, 78, 71])
            .await
            .unwrap();
        h.wizard.set_field(DraftField::Amount, "1000").unwrap();
        h.wizard.next().unwrap();
        let result = h.wizard.submit().await.unwrap();

        assert_eq!(result.base_units, 1_000_000_000_000);
        assert_eq!(h.pinning.documents()[0]["image"], url.as_str());
    }

    impl Harness {
        fn wallet_key(&self) -> Pubkey {
            use tokenforge_sdk::WalletAdapter;
            self.wallet.public_key().unwrap()
        }
    }
}
