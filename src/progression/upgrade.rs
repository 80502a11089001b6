//! Upgrade
//!
//! Burn `request * required_monster` source-rank monsters and
//! `request * required_stone` stone; every signature rolls one monster of
//! the next rank.

use tracing::{debug, info};

use crate::config::{validate_upgrade, UpgradeRequirement};
use crate::core::amount::{checked_cost, checked_sum};
use crate::core::id::{Address, Amount, MonsterId, SeasonId};
use crate::core::rank::RankTier;
use crate::engine::{CallContext, Engine};
use crate::error::EconomyError;
use crate::events::{ConfigTable, EventData};
use crate::gate::reward::{roll_picks, RewardSet};
use crate::ledger::{Asset, LedgerBatch};
use crate::oracle::OracleSignature;

impl Engine {
    /// Upgrade `request_amount` times out of `source_rank`.
    ///
    /// `ids`/`amounts` name the source monsters to burn. The requirement
    /// applies to the total, not to each id: any mix of normal
    /// `source_rank` ids is accepted as long as the amounts add up to
    /// `request_amount * required_monster[source_rank]`. Returns the minted
    /// next-rank monsters.
    pub fn upgrade(
        &mut self,
        call: CallContext,
        source_rank: RankTier,
        request_amount: u64,
        ids: &[MonsterId],
        amounts: &[Amount],
        signatures: &[OracleSignature],
    ) -> Result<RewardSet, EconomyError> {
        let hunter = call.sender;
        let target_rank = source_rank
            .next()
            .ok_or(EconomyError::InvalidRankType(source_rank))?;
        if request_amount == 0 {
            return Err(EconomyError::InvalidArgument("upgrade request must be positive"));
        }
        if ids.is_empty() || ids.len() != amounts.len() {
            return Err(EconomyError::InvalidMonster);
        }
        if ids.iter().any(|id| !self.registry.contains(source_rank, false, *id)) {
            return Err(EconomyError::InvalidMonster);
        }

        let requirement = self.config.progression.upgrade[source_rank.index()];
        let required_monsters = checked_cost(request_amount, requirement.monsters as Amount)?;
        if checked_sum(amounts.iter().copied())? != required_monsters {
            return Err(EconomyError::InvalidMonster);
        }
        if signatures.len() as u64 != request_amount {
            return Err(EconomyError::InvalidMonsterSignature {
                expected: request_amount,
                got: signatures.len() as u64,
            });
        }
        let used_stone = checked_cost(request_amount, requirement.stone)?;

        let season_id = self.progress_season(call.block);
        let upgrades = self
            .progress
            .progress(season_id, &hunter)
            .upgrades[source_rank.index()]
            .checked_add(request_amount)
            .ok_or(EconomyError::ArithmeticOverflow)?;

        let attestation = self.oracle.verify(&hunter, signatures)?;

        let mut minted = RewardSet::new();
        if !roll_picks(self.registry.pool(target_rank, false), attestation.values(), &mut minted) {
            return Err(EconomyError::EmptyCandidatePool { rank: target_rank, is_shadow: false });
        }

        let mut batch = LedgerBatch::new();
        for (id, amount) in ids.iter().zip(amounts) {
            batch.burn(hunter, Asset::Monster(*id), *amount);
        }
        batch.burn(hunter, Asset::EssenceStone, used_stone);
        minted.stage_mints(&mut batch, hunter, Asset::Monster);
        self.apply_batch(&batch)?;

        self.oracle.commit(&attestation);
        self.progress.progress_mut(season_id, hunter).upgrades[source_rank.index()] = upgrades;

        debug!("Upgrade rolled {} distinct {} ids", minted.distinct(), target_rank);
        info!(
            "{} upgraded {} x {} -> {}, used {} stone",
            hunter.short(),
            request_amount,
            source_rank,
            target_rank,
            used_stone
        );
        self.emit(call, EventData::MonsterUpgraded {
            hunter,
            source_rank,
            request_amount,
            used_stone,
            minted: minted.clone(),
        });
        Ok(minted)
    }

    /// Upgrades a hunter performed out of `source_rank` in a season.
    pub fn upgrade_count(&self, season_id: SeasonId, hunter: &Address, source_rank: RankTier) -> u64 {
        self.progress.progress(season_id, hunter).upgrades[source_rank.index()]
    }

    /// Replace upgrade costs (operator only).
    pub fn set_upgrade_requirements(
        &mut self,
        call: CallContext,
        requirements: &[UpgradeRequirement],
    ) -> Result<(), EconomyError> {
        self.roles.ensure_operator(&call.sender)?;
        self.config.progression.upgrade = validate_upgrade(requirements)?;
        self.table_updated(call, ConfigTable::UpgradeRequirements);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Fixture, HUNTER, SEASON};

    fn upgrade_fixture() -> (Fixture, MonsterId) {
        let mut fx = Fixture::new();
        let admin = fx.admin(1);
        let source = fx.engine.add_monster(admin, RankTier::E, false).unwrap();
        fx.engine.add_monsters(admin, RankTier::D, false, 3).unwrap();
        (fx, source)
    }

    #[test]
    fn test_upgrade_request_ten() {
        let (mut fx, source) = upgrade_fixture();
        assert_eq!(source, 1);
        // 5 monsters and 1 stone per E upgrade
        fx.fund(Asset::Monster(source), 50);
        fx.fund(Asset::EssenceStone, 10);

        let signatures = fx.sign(10);
        let minted = fx
            .engine
            .upgrade(fx.call(10), RankTier::E, 10, &[source], &[50], &signatures)
            .unwrap();

        assert_eq!(minted.total(), 10);
        let d_pool = fx.engine.registry().pool(RankTier::D, false).to_vec();
        assert!(minted.iter().all(|(id, _)| d_pool.contains(&id)));
        let held: Amount = d_pool.iter().map(|id| fx.balance(Asset::Monster(*id))).sum();
        assert_eq!(held, 10);

        assert_eq!(fx.balance(Asset::Monster(source)), 0);
        assert_eq!(fx.balance(Asset::EssenceStone), 0);
        assert_eq!(fx.engine.upgrade_count(SEASON, &HUNTER, RankTier::E), 10);
        assert_eq!(fx.engine.nonce_of(&HUNTER), 10);
    }

    #[test]
    fn test_upgrade_validation() {
        let (mut fx, source) = upgrade_fixture();
        fx.fund(Asset::Monster(source), 50);
        fx.fund(Asset::EssenceStone, 10);
        let call = fx.call(10);
        let two = fx.sign(2);

        assert!(matches!(
            fx.engine.upgrade(call, RankTier::S, 1, &[source], &[5], &two[..1]),
            Err(EconomyError::InvalidRankType(RankTier::S))
        ));
        assert!(matches!(
            fx.engine.upgrade(call, RankTier::E, 0, &[source], &[5], &[]),
            Err(EconomyError::InvalidArgument(_))
        ));
        assert!(matches!(
            fx.engine.upgrade(call, RankTier::E, 2, &[source], &[5, 5], &two),
            Err(EconomyError::InvalidMonster)
        ));
        assert!(matches!(
            fx.engine.upgrade(call, RankTier::E, 2, &[source], &[9], &two),
            Err(EconomyError::InvalidMonster)
        ));
        // id 2 is a D monster
        assert!(matches!(
            fx.engine.upgrade(call, RankTier::E, 2, &[2], &[10], &two),
            Err(EconomyError::InvalidMonster)
        ));
        assert!(matches!(
            fx.engine.upgrade(call, RankTier::E, 2, &[source], &[10], &two[..1]),
            Err(EconomyError::InvalidMonsterSignature { expected: 2, got: 1 })
        ));
        assert_eq!(fx.engine.nonce_of(&HUNTER), 0);
    }

    #[test]
    fn test_upgrade_accepts_mixed_source_ids() {
        let (mut fx, source) = upgrade_fixture();
        let admin = fx.admin(1);
        let other = fx.engine.add_monster(admin, RankTier::E, false).unwrap();
        fx.fund(Asset::Monster(source), 3);
        fx.fund(Asset::Monster(other), 2);
        fx.fund(Asset::EssenceStone, 1);

        let signatures = fx.sign(1);
        let minted = fx
            .engine
            .upgrade(fx.call(10), RankTier::E, 1, &[source, other], &[3, 2], &signatures)
            .unwrap();

        assert_eq!(minted.total(), 1);
        assert_eq!(fx.balance(Asset::Monster(source)), 0);
        assert_eq!(fx.balance(Asset::Monster(other)), 0);
        assert_eq!(fx.engine.upgrade_count(SEASON, &HUNTER, RankTier::E), 1);
    }

    #[test]
    fn test_upgrade_insufficient_monsters_rolls_back() {
        let (mut fx, source) = upgrade_fixture();
        fx.fund(Asset::Monster(source), 4);
        fx.fund(Asset::EssenceStone, 1);
        let hash = fx.engine.state_hash();

        let signatures = fx.sign(1);
        let err = fx
            .engine
            .upgrade(fx.call(10), RankTier::E, 1, &[source], &[5], &signatures)
            .unwrap_err();

        assert!(matches!(err, EconomyError::Ledger(_)));
        assert_eq!(fx.engine.state_hash(), hash);
        assert_eq!(fx.balance(Asset::Monster(source)), 4);
        assert_eq!(fx.balance(Asset::EssenceStone), 1);
        assert_eq!(fx.engine.upgrade_count(SEASON, &HUNTER, RankTier::E), 0);
    }

    #[test]
    fn test_upgrade_empty_target_pool() {
        let mut fx = Fixture::new();
        let admin = fx.admin(1);
        let source = fx.engine.add_monster(admin, RankTier::C, false).unwrap();
        fx.fund(Asset::Monster(source), 5);
        fx.fund(Asset::EssenceStone, 4);

        let signatures = fx.sign(1);
        assert!(matches!(
            fx.engine.upgrade(fx.call(10), RankTier::C, 1, &[source], &[5], &signatures),
            Err(EconomyError::EmptyCandidatePool { rank: RankTier::B, is_shadow: false })
        ));
    }

    #[test]
    fn test_upgrade_outside_season_counts_under_zero() {
        let (mut fx, source) = upgrade_fixture();
        fx.fund(Asset::Monster(source), 5);
        fx.fund(Asset::EssenceStone, 1);

        let signatures = fx.sign(1);
        fx.engine
            .upgrade(fx.call(50_000), RankTier::E, 1, &[source], &[5], &signatures)
            .unwrap();

        assert_eq!(fx.engine.upgrade_count(0, &HUNTER, RankTier::E), 1);
        assert_eq!(fx.engine.upgrade_count(SEASON, &HUNTER, RankTier::E), 0);
    }

    #[test]
    fn test_set_upgrade_requirements() {
        let mut fx = Fixture::new();
        let admin = fx.admin(1);
        let table = [UpgradeRequirement { monsters: 3, stone: 0 }; 6];

        assert!(matches!(
            fx.engine.set_upgrade_requirements(fx.call(1), &table),
            Err(EconomyError::OnlyOperator)
        ));
        fx.engine.set_upgrade_requirements(admin, &table).unwrap();
        assert_eq!(fx.engine.config().progression.upgrade[0].monsters, 3);
        assert!(fx.engine.set_upgrade_requirements(admin, &table[..4]).is_err());
    }
}
