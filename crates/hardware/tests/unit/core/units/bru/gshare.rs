//! Global History Predictor Tests.
//!
//! Covers PHT indexing under both hashes, counter training, speculative
//! history handling (lookup, squash, squashed update, BTB correction) and
//! configuration validation.

use ipvsim_core::common::ConfigError;
use ipvsim_core::config::{BranchPredictorConfig, IndexHash};
use ipvsim_core::core::units::bru::{BranchPredictor, GSharePredictor, SatCounter};
use pretty_assertions::assert_eq;
use rstest::rstest;

const PC: u64 = 0x1000;

fn predictor(config: &BranchPredictorConfig) -> GSharePredictor {
    crate::common::init_tracing();
    match GSharePredictor::new(config) {
        Ok(bp) => bp,
        Err(e) => panic!("predictor rejected: {e}"),
    }
}

/// Resolves one branch at `pc` with zero history left in place afterwards.
fn train(bp: &mut GSharePredictor, pc: u64, taken: bool) {
    let (_, history) = bp.lookup(0, pc);
    bp.squash(0, history);
    bp.update(0, pc, taken, history, false);
}

// ══════════════════════════════════════════════════════════
// 1. Saturating counters
// ══════════════════════════════════════════════════════════

#[test]
fn counter_saturates_at_both_ends() {
    let Ok(mut counter) = SatCounter::new(2) else {
        panic!("2-bit counter rejected");
    };
    assert_eq!(counter.value(), 0);

    counter.decrement();
    assert_eq!(counter.value(), 0);

    for _ in 0..5 {
        counter.increment();
    }
    assert_eq!(counter.value(), 3);
    assert_eq!(counter.max(), 3);
}

#[rstest]
#[case(1, 1)]
#[case(3, 7)]
#[case(8, 255)]
fn counter_max_follows_width(#[case] bits: u32, #[case] max: u8) {
    let Ok(counter) = SatCounter::new(bits) else {
        panic!("{bits}-bit counter rejected");
    };
    assert_eq!(counter.max(), max);
}

#[rstest]
#[case(0)]
#[case(9)]
fn counter_width_out_of_range(#[case] bits: u32) {
    assert!(matches!(
        SatCounter::new(bits),
        Err(ConfigError::CounterBitsOutOfRange(b)) if b == bits
    ));
}

// ══════════════════════════════════════════════════════════
// 2. Indexing
// ══════════════════════════════════════════════════════════

#[test]
fn nand_index_with_empty_history_is_all_ones() {
    let bp = predictor(&BranchPredictorConfig::default());
    assert_eq!(bp.index(PC, 0), 4095);
}

#[test]
fn nand_index_clears_shared_bits() {
    let bp = predictor(&BranchPredictorConfig::default());
    // pc bits 0x400 AND history 0x400 -> NOT -> every bit but 0x400.
    assert_eq!(bp.index(PC, 0x400), 0xFFF & !0x400);
}

#[test]
fn xor_index_is_classic_gshare() {
    let config = BranchPredictorConfig {
        hash: IndexHash::Xor,
        ..BranchPredictorConfig::default()
    };
    let bp = predictor(&config);

    assert_eq!(bp.index(PC, 0), 0x400);
    assert_eq!(bp.index(PC, 0x401), 0x001);
}

#[test]
fn index_stays_inside_table() {
    let config = BranchPredictorConfig {
        predictor_size: 16,
        ..BranchPredictorConfig::default()
    };
    let bp = predictor(&config);

    for pc in [0u64, 0x4, 0xFFFF_FFFF, u64::MAX] {
        assert!(bp.index(pc, u64::MAX) < 16);
        assert!(bp.index(pc, 0) < 16);
    }
}

// ══════════════════════════════════════════════════════════
// 3. Prediction and training
// ══════════════════════════════════════════════════════════

#[test]
fn fresh_predictor_predicts_not_taken() {
    let mut bp = predictor(&BranchPredictorConfig::default());
    let (taken, history) = bp.lookup(0, PC);

    assert!(!taken);
    assert!(!history.predicted_taken);
    assert_eq!(history.global_history, 0);
}

#[test]
fn two_taken_outcomes_flip_a_two_bit_counter() {
    let mut bp = predictor(&BranchPredictorConfig::default());

    train(&mut bp, PC, true);
    let (taken, history) = bp.lookup(0, PC);
    assert!(!taken);
    bp.squash(0, history);

    train(&mut bp, PC, true);
    let (taken, _) = bp.lookup(0, PC);
    assert!(taken);
    assert_eq!(bp.counter(bp.index(PC, 0)).value(), 2);
}

#[test]
fn not_taken_outcomes_train_back_down() {
    let mut bp = predictor(&BranchPredictorConfig::default());
    for _ in 0..4 {
        train(&mut bp, PC, true);
    }
    for _ in 0..2 {
        train(&mut bp, PC, false);
    }

    let (taken, _) = bp.lookup(0, PC);
    assert!(!taken);
    assert_eq!(bp.counter(bp.index(PC, 0)).value(), 1);
}

#[test]
fn lookup_shifts_prediction_into_history() {
    let mut bp = predictor(&BranchPredictorConfig::default());
    train(&mut bp, PC, true);
    train(&mut bp, PC, true);

    let _ = bp.lookup(0, PC);
    assert_eq!(bp.global_history(0), 1);
}

#[test]
fn unconditional_branch_predicts_taken() {
    let mut bp = predictor(&BranchPredictorConfig::default());
    let history = bp.uncond_branch(0, PC);

    assert!(history.predicted_taken);
    assert_eq!(history.global_history, 0);
    assert_eq!(bp.global_history(0), 1);
}

// ══════════════════════════════════════════════════════════
// 4. Speculative history repair
// ══════════════════════════════════════════════════════════

#[test]
fn squash_restores_snapshot() {
    let mut bp = predictor(&BranchPredictorConfig::default());
    let _ = bp.uncond_branch(0, PC);
    let (_, history) = bp.lookup(0, PC);
    let _ = bp.uncond_branch(0, PC);

    bp.squash(0, history);
    assert_eq!(bp.global_history(0), 0b1);
}

#[test]
fn squashed_update_rewrites_history_only() {
    let mut bp = predictor(&BranchPredictorConfig::default());
    for _ in 0..3 {
        let _ = bp.uncond_branch(0, PC);
    }
    let (_, history) = bp.lookup(0, PC);
    assert_eq!(bp.global_history(0), 0b1110);

    bp.update(0, PC, true, history, true);

    assert_eq!(bp.global_history(0), 0b1111);
    assert_eq!(bp.counter(bp.index(PC, 0b111)).value(), 0);
}

#[test]
fn btb_update_clears_speculative_bit() {
    let mut bp = predictor(&BranchPredictorConfig::default());
    let _ = bp.uncond_branch(0, PC);
    let mut history = bp.uncond_branch(0, PC);
    assert_eq!(bp.global_history(0), 0b11);

    bp.btb_update(0, PC, &mut history);
    assert_eq!(bp.global_history(0), 0b10);
}

#[test]
fn history_is_masked_to_configured_width() {
    let config = BranchPredictorConfig {
        global_history_bits: 4,
        ..BranchPredictorConfig::default()
    };
    let mut bp = predictor(&config);
    for _ in 0..6 {
        let _ = bp.uncond_branch(0, PC);
    }
    assert_eq!(bp.global_history(0), 0b1111);

    let history = bp.uncond_branch(0, PC);
    bp.update(0, PC, true, history, true);
    assert_eq!(bp.global_history(0), 0b1111);
}

#[test]
fn threads_keep_separate_histories() {
    let config = BranchPredictorConfig {
        num_threads: 2,
        ..BranchPredictorConfig::default()
    };
    let mut bp = predictor(&config);

    let _ = bp.uncond_branch(0, PC);
    let _ = bp.uncond_branch(0, PC);
    let _ = bp.uncond_branch(1, PC);

    assert_eq!(bp.global_history(0), 0b11);
    assert_eq!(bp.global_history(1), 0b1);
}

// ══════════════════════════════════════════════════════════
// 5. Configuration errors
// ══════════════════════════════════════════════════════════

#[test]
fn zero_threads_rejected() {
    let config = BranchPredictorConfig {
        num_threads: 0,
        ..BranchPredictorConfig::default()
    };
    assert!(matches!(
        GSharePredictor::new(&config),
        Err(ConfigError::ZeroThreads)
    ));
}

#[rstest]
#[case(0)]
#[case(3000)]
fn table_size_must_be_power_of_two(#[case] size: usize) {
    let config = BranchPredictorConfig {
        predictor_size: size,
        ..BranchPredictorConfig::default()
    };
    assert!(matches!(
        GSharePredictor::new(&config),
        Err(ConfigError::PredictorSizeNotPowerOfTwo(s)) if s == size
    ));
}

#[rstest]
#[case(0)]
#[case(65)]
fn history_width_out_of_range(#[case] bits: u32) {
    let config = BranchPredictorConfig {
        global_history_bits: bits,
        ..BranchPredictorConfig::default()
    };
    assert!(matches!(
        GSharePredictor::new(&config),
        Err(ConfigError::HistoryBitsOutOfRange(b)) if b == bits
    ));
}

#[test]
fn full_width_history_accepted() {
    let config = BranchPredictorConfig {
        global_history_bits: 64,
        counter_bits: 8,
        ..BranchPredictorConfig::default()
    };
    let mut bp = predictor(&config);
    for _ in 0..70 {
        let _ = bp.uncond_branch(0, PC);
    }
    assert_eq!(bp.global_history(0), u64::MAX);
}
