//! End-to-end governance scenarios.

mod common;

use common::*;
use guild_dao::{DaoError, ProposalCategory, ProposalDraft, ProposalStatus};
use guild_nullables::{CallRecorder, Reverter};
use guild_types::{whole_shares, Address, ErrorKind};

#[test]
fn mint_proposal_credits_new_member() {
    let mut fx = Fixture::with(&[(alice(), whole_shares(10))], &slots(30, 0, 0, 60), false);
    let newcomer = Address::repeat_byte(0x77);

    let id = fx
        .dao
        .propose(
            &alice(),
            ProposalCategory::Mint,
            ProposalDraft::new("welcome").entry(newcomer, whole_shares(1_000), vec![]),
        )
        .unwrap();
    fx.advance(1);
    fx.dao.vote(&alice(), id, true).unwrap();
    fx.advance(35);

    assert!(fx.dao.process_proposal(id).unwrap());
    assert_eq!(fx.dao.balance_of(&newcomer), whole_shares(1_000));
    assert_eq!(fx.dao.get_current_votes(&newcomer), whole_shares(1_000));
    assert_eq!(fx.dao.total_supply(), whole_shares(1_010));
}

#[test]
fn grace_period_delays_processing() {
    let mut fx = Fixture::with(&[(alice(), whole_shares(10))], &slots(90, 30, 0, 60), false);
    let id = fx
        .dao
        .propose(
            &alice(),
            ProposalCategory::Mint,
            ProposalDraft::new("grant").entry(bob(), whole_shares(1), vec![]),
        )
        .unwrap();
    let opened = fx.now().as_secs();
    fx.advance(1);
    fx.dao.vote(&alice(), id, true).unwrap();

    // voting closed but still inside the grace period
    fx.clock.set(opened + 90 + 29);
    let err = fx.dao.process_proposal(id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Timing);
    assert_eq!(fx.dao.balance_of(&bob()), 0);

    fx.clock.set(opened + 90 + 30);
    assert!(fx.dao.process_proposal(id).unwrap());
    assert_eq!(fx.dao.balance_of(&bob()), whole_shares(1));
}

#[test]
fn quorum_proposal_bounds() {
    let mut fx = Fixture::standard();

    let err = fx
        .dao
        .propose(&alice(), ProposalCategory::Quorum, single(101))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(fx.dao.proposal_count(), 0);

    assert!(fx.pass(ProposalCategory::Quorum, single(100)));
    assert_eq!(fx.dao.quorum(), 100);
}

#[test]
fn pause_gate_follows_pause_proposals() {
    let mut fx = Fixture::with(
        &[(alice(), whole_shares(10)), (bob(), whole_shares(5))],
        &slots(30, 0, 0, 60),
        true,
    );
    for amount in [1, whole_shares(1), whole_shares(10)] {
        let err = fx.dao.transfer(&alice(), &carol(), amount).unwrap_err();
        assert!(matches!(err, DaoError::Ledger(_)), "{err}");
        assert_eq!(err.kind(), ErrorKind::State);
    }

    assert!(fx.pass(ProposalCategory::Pause, ProposalDraft::new("unpause")));
    assert!(!fx.dao.paused());
    fx.dao.transfer(&alice(), &carol(), whole_shares(1)).unwrap();
    assert_eq!(fx.dao.balance_of(&carol()), whole_shares(1));

    assert!(fx.pass(ProposalCategory::Pause, ProposalDraft::new("pause again")));
    assert!(fx.dao.paused());
    assert!(fx.dao.transfer(&alice(), &carol(), 1).is_err());
}

#[test]
fn failing_sub_call_reverts_whole_batch() {
    let mut fx = Fixture::standard();
    let recorder = Address::repeat_byte(0x01);
    let reverter = Address::repeat_byte(0x02);
    fx.dao.host_mut().deploy(recorder, CallRecorder::new());
    fx.dao.host_mut().deploy(reverter, Reverter);
    fx.dao.host_mut().fund(&dao_address(), 100);

    let id = fx.propose_and_approve(
        ProposalCategory::Call,
        ProposalDraft::new("two calls")
            .entry(recorder, 10, b"first".to_vec())
            .entry(reverter, 20, b"second".to_vec()),
    );
    fx.wait_out_voting();

    let events_before = fx.dao.events().len();
    let err = fx.dao.process_proposal(id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ExternalCall);

    let host = fx.dao.host();
    assert!(host.contract::<CallRecorder>(&recorder).unwrap().calls.is_empty());
    assert_eq!(host.native_balance(&dao_address()), 100);
    assert_eq!(host.native_balance(&recorder), 0);
    assert_eq!(fx.dao.events().len(), events_before);
    assert_eq!(
        fx.dao.proposal(id).unwrap().status,
        ProposalStatus::VotingOpen
    );

    // still unprocessed, so a retry runs the batch again and fails again
    assert!(fx.dao.process_proposal(id).is_err());
}

#[test]
fn call_batch_executes_in_order_and_forwards_value() {
    let mut fx = Fixture::standard();
    let recorder = Address::repeat_byte(0x01);
    let skipped = Address::repeat_byte(0x03);
    fx.dao.host_mut().deploy(recorder, CallRecorder::new());
    fx.dao.host_mut().fund(&dao_address(), 100);

    assert!(fx.pass(
        ProposalCategory::Call,
        ProposalDraft::new("pay and ping")
            .entry(recorder, 40, b"pay".to_vec())
            // no payload: skipped even though nothing is deployed there
            .entry(skipped, 50, Vec::new())
            .entry(recorder, 0, b"ping".to_vec()),
    ));

    let host = fx.dao.host();
    let calls = &host.contract::<CallRecorder>(&recorder).unwrap().calls;
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].payload, b"pay");
    assert_eq!(calls[0].value, 40);
    assert_eq!(calls[0].caller, dao_address());
    assert_eq!(calls[1].payload, b"ping");
    assert_eq!(host.native_balance(&recorder), 40);
    assert_eq!(host.native_balance(&skipped), 0);
    assert_eq!(host.native_balance(&dao_address()), 60);
}

#[test]
fn call_without_treasury_funds_fails() {
    let mut fx = Fixture::standard();
    let recorder = Address::repeat_byte(0x01);
    fx.dao.host_mut().deploy(recorder, CallRecorder::new());

    let id = fx.propose_and_approve(
        ProposalCategory::Call,
        ProposalDraft::new("overspend").entry(recorder, 1, b"pay".to_vec()),
    );
    fx.wait_out_voting();
    let err = fx.dao.process_proposal(id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ExternalCall);
}

#[test]
fn call_to_empty_address_fails() {
    let mut fx = Fixture::standard();
    let id = fx.propose_and_approve(
        ProposalCategory::Call,
        ProposalDraft::new("nobody home").entry(Address::repeat_byte(0x09), 0, b"x".to_vec()),
    );
    fx.wait_out_voting();
    let err = fx.dao.process_proposal(id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ExternalCall);
}
