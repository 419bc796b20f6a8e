//! Signed votes, delegations and permits.

mod common;

use common::*;
use guild_crypto::{derive_address, keypair_from_seed};
use guild_dao::{
    DaoError, DelegationMessage, PermitMessage, ProposalCategory, ProposalDraft, SignedMessage,
    VoteMessage,
};
use guild_types::{whole_shares, ErrorKind, KeyPair, Timestamp};

struct Signer {
    keys: KeyPair,
}

impl Signer {
    fn new(seed: u8) -> Self {
        Self {
            keys: keypair_from_seed(&[seed; 32]),
        }
    }

    fn address(&self) -> guild_types::Address {
        derive_address(&self.keys.public)
    }
}

/// A DAO where the signer holds 10 shares and alice 5.
fn setup(signer: &Signer) -> Fixture {
    Fixture::with(
        &[(signer.address(), whole_shares(10)), (alice(), whole_shares(5))],
        &slots(30, 0, 0, 60),
        false,
    )
}

fn open_proposal(fx: &mut Fixture) -> u64 {
    let id = fx
        .dao
        .propose(
            &alice(),
            ProposalCategory::Mint,
            ProposalDraft::new("grant").entry(carol(), 1, vec![]),
        )
        .unwrap();
    fx.advance(1);
    id
}

#[test]
fn vote_by_sig_counts_signer_weight() {
    let signer = Signer::new(1);
    let mut fx = setup(&signer);
    let id = open_proposal(&mut fx);

    let vote = VoteMessage {
        signer: signer.address(),
        proposal: id,
        approve: true,
        nonce: fx.dao.nonces(&signer.address()),
        expiry: fx.now().plus(60),
    };
    let signed = SignedMessage::sign(fx.dao.domain(), &vote, &signer.keys);

    // anyone may relay the signed vote
    assert_eq!(fx.dao.vote_by_sig(&vote, &signed).unwrap(), whole_shares(10));
    assert_eq!(fx.dao.nonces(&signer.address()), 1);
    assert_eq!(fx.dao.proposal(id).unwrap().yes_votes, whole_shares(10));

    // replaying the same signature is a stale nonce
    let err = fx.dao.vote_by_sig(&vote, &signed).unwrap_err();
    assert!(matches!(err, DaoError::InvalidNonce { .. }));

    // a fresh signature still cannot vote twice
    let again = VoteMessage { nonce: 1, ..vote };
    let signed = SignedMessage::sign(fx.dao.domain(), &again, &signer.keys);
    let err = fx.dao.vote_by_sig(&again, &signed).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::State);
    // failure left the nonce untouched
    assert_eq!(fx.dao.nonces(&signer.address()), 1);
}

#[test]
fn direct_and_signed_votes_share_the_voter_set() {
    let signer = Signer::new(2);
    let mut fx = setup(&signer);
    let id = open_proposal(&mut fx);
    fx.dao.vote(&signer.address(), id, false).unwrap();

    let vote = VoteMessage {
        signer: signer.address(),
        proposal: id,
        approve: true,
        nonce: 0,
        expiry: fx.now().plus(60),
    };
    let signed = SignedMessage::sign(fx.dao.domain(), &vote, &signer.keys);
    assert!(fx.dao.vote_by_sig(&vote, &signed).is_err());
}

#[test]
fn expired_vote_is_rejected() {
    let signer = Signer::new(3);
    let mut fx = setup(&signer);
    let id = open_proposal(&mut fx);

    let vote = VoteMessage {
        signer: signer.address(),
        proposal: id,
        approve: true,
        nonce: 0,
        expiry: fx.now(),
    };
    let signed = SignedMessage::sign(fx.dao.domain(), &vote, &signer.keys);
    fx.advance(1);
    let err = fx.dao.vote_by_sig(&vote, &signed).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Timing);
    assert_eq!(fx.dao.nonces(&signer.address()), 0);
}

#[test]
fn forged_vote_is_rejected() {
    let signer = Signer::new(4);
    let forger = Signer::new(5);
    let mut fx = setup(&signer);
    let id = open_proposal(&mut fx);

    let vote = VoteMessage {
        signer: signer.address(),
        proposal: id,
        approve: false,
        nonce: 0,
        expiry: fx.now().plus(60),
    };
    let forged = SignedMessage::sign(fx.dao.domain(), &vote, &forger.keys);
    let err = fx.dao.vote_by_sig(&vote, &forged).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);

    // signature lifted from another dao's domain
    let mut foreign = fx.dao.domain().clone();
    foreign.chain_id += 1;
    let replayed = SignedMessage::sign(&foreign, &vote, &signer.keys);
    let err = fx.dao.vote_by_sig(&vote, &replayed).unwrap_err();
    assert!(matches!(err, DaoError::InvalidSignature));
    assert_eq!(fx.dao.proposal(id).unwrap().no_votes, 0);
}

#[test]
fn delegate_by_sig_moves_votes() {
    let signer = Signer::new(6);
    let mut fx = setup(&signer);

    let msg = DelegationMessage {
        delegatee: bob(),
        nonce: 0,
        expiry: fx.now().plus(10),
    };
    let signed = SignedMessage::sign(fx.dao.domain(), &msg, &signer.keys);
    fx.dao.delegate_by_sig(&msg, &signed).unwrap();

    assert_eq!(fx.dao.delegates(&signer.address()), bob());
    assert_eq!(fx.dao.get_current_votes(&signer.address()), 0);
    assert_eq!(fx.dao.get_current_votes(&bob()), whole_shares(10));
    assert!(fx.dao.delegate_by_sig(&msg, &signed).is_err());
}

#[test]
fn permit_sets_allowance_and_shares_nonce() {
    let signer = Signer::new(7);
    let mut fx = setup(&signer);

    let permit = PermitMessage {
        owner: signer.address(),
        spender: bob(),
        value: whole_shares(3),
        nonce: 0,
        deadline: fx.now().plus(10),
    };
    let signed = SignedMessage::sign(fx.dao.domain(), &permit, &signer.keys);
    fx.dao.permit(&permit, &signed).unwrap();
    assert_eq!(fx.dao.allowance(&signer.address(), &bob()), whole_shares(3));

    fx.dao
        .transfer_from(&bob(), &signer.address(), &carol(), whole_shares(2))
        .unwrap();
    assert_eq!(fx.dao.balance_of(&carol()), whole_shares(2));
    assert_eq!(fx.dao.allowance(&signer.address(), &bob()), whole_shares(1));

    // the delegation nonce sequence is the same one
    let msg = DelegationMessage {
        delegatee: bob(),
        nonce: 0,
        expiry: fx.now().plus(10),
    };
    let stale = SignedMessage::sign(fx.dao.domain(), &msg, &signer.keys);
    assert!(matches!(
        fx.dao.delegate_by_sig(&msg, &stale),
        Err(DaoError::InvalidNonce {
            expected: 1,
            got: 0
        })
    ));
}

#[test]
fn permit_owner_must_sign() {
    let signer = Signer::new(8);
    let mut fx = setup(&signer);
    let permit = PermitMessage {
        owner: alice(),
        spender: bob(),
        value: u128::MAX,
        nonce: 0,
        deadline: Timestamp::new(u64::MAX),
    };
    let signed = SignedMessage::sign(fx.dao.domain(), &permit, &signer.keys);
    let err = fx.dao.permit(&permit, &signed).unwrap_err();
    assert!(matches!(err, DaoError::SignerMismatch { .. }));
    assert_eq!(fx.dao.allowance(&alice(), &bob()), 0);
}
