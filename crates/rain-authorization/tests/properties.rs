//! Property tests for the tier rules of the decision engine

mod common;

use common::{id, Community};
use proptest::prelude::*;
use rain_core::{CapabilityTier, ChainAddress};
use rain_testkit::{test_address, EntryBuilder, MockIdentityProvider, MockLedger};

fn any_tier() -> impl Strategy<Value = CapabilityTier> {
    prop_oneof![
        Just(CapabilityTier::None),
        Just(CapabilityTier::Member),
        Just(CapabilityTier::Moderator),
        Just(CapabilityTier::Admin),
        Just(CapabilityTier::Owner),
    ]
}

/// Tier as the engine observes it; membership is never probed
fn observed(tier: CapabilityTier) -> CapabilityTier {
    match tier {
        CapabilityTier::Member => CapabilityTier::None,
        other => other,
    }
}

async fn record(ledger: &MockLedger, address: ChainAddress, tier: CapabilityTier) {
    match tier {
        CapabilityTier::None => {}
        CapabilityTier::Member => ledger.set_member(address, true).await,
        CapabilityTier::Moderator => ledger.set_moderator(address, true).await,
        CapabilityTier::Admin => ledger.set_admin(address, true).await,
        CapabilityTier::Owner => ledger.set_owner(address).await,
    }
}

/// Verdict for `actor` (at `acting`) deleting an entry by `author` (at `target`)
fn delete_verdict(acting: CapabilityTier, target: CapabilityTier, signature_valid: bool) -> bool {
    tokio_test::block_on(async {
        let community = Community::new();
        let actor_address = test_address(1);
        // Only one owner slot: two owner-tier identities share its address
        let author_address = if acting == CapabilityTier::Owner && target == CapabilityTier::Owner
        {
            actor_address
        } else {
            test_address(2)
        };
        community.directory.link("did:3:actor", actor_address).await;
        community.directory.link("did:3:author", author_address).await;
        record(&community.ledger, actor_address, acting).await;
        record(&community.ledger, author_address, target).await;

        let controller = community.controller().await;
        let original = community.post("did:3:author").await;
        let del = EntryBuilder::del("did:3:actor", &original.hash).build();
        controller
            .can_append(&del, &MockIdentityProvider::with_verdict(signature_valid))
            .await
            .unwrap()
    })
}

proptest! {
    #[test]
    fn owner_flag_dominates(admin in any::<bool>(), moderator in any::<bool>()) {
        let tier = tokio_test::block_on(async {
            let community = Community::new();
            let address = community.member("did:3:root", 9).await;
            community.ledger.set_owner(address).await;
            community.ledger.set_admin(address, admin).await;
            community.ledger.set_moderator(address, moderator).await;
            community.controller().await.capability_of(&id("did:3:root")).await.unwrap()
        });
        prop_assert_eq!(tier, CapabilityTier::Owner);
    }

    #[test]
    fn self_delete_follows_signature(
        tier in any_tier(),
        open in any::<bool>(),
        signature_valid in any::<bool>()
    ) {
        let verdict = tokio_test::block_on(async {
            let community = Community::new();
            let address = community.member("did:3:self", 3).await;
            record(&community.ledger, address, tier).await;
            community.ledger.set_open(open).await;
            let controller = community.controller().await;

            let own = community.post("did:3:self").await;
            let del = EntryBuilder::del("did:3:self", &own.hash).build();
            controller
                .can_append(&del, &MockIdentityProvider::with_verdict(signature_valid))
                .await
                .unwrap()
        });
        prop_assert_eq!(verdict, signature_valid);
    }

    #[test]
    fn delete_requires_strictly_higher_tier(
        acting in any_tier(),
        target in any_tier(),
        signature_valid in any::<bool>()
    ) {
        let verdict = delete_verdict(acting, target, signature_valid);
        let (acting, target) = (observed(acting), observed(target));

        if target == CapabilityTier::Owner {
            prop_assert!(!verdict);
        } else if acting > target {
            prop_assert_eq!(verdict, signature_valid);
        } else {
            prop_assert!(!verdict);
        }
    }

    #[test]
    fn add_is_ledger_and_signature(
        tier in any_tier(),
        signature_valid in any::<bool>()
    ) {
        let verdict = tokio_test::block_on(async {
            let community = Community::new();
            let address = community.member("did:3:poster", 4).await;
            record(&community.ledger, address, tier).await;
            let controller = community.controller().await;

            let entry = EntryBuilder::add("did:3:poster").build();
            controller
                .can_append(&entry, &MockIdentityProvider::with_verdict(signature_valid))
                .await
                .unwrap()
        });
        let granted = tier != CapabilityTier::None;
        prop_assert_eq!(verdict, granted && signature_valid);
    }
}
