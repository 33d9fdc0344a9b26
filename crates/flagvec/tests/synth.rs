use flagvec::{
    generate, generate_x86, plan, table_len, x86_catalog, FlagAccumulator, GenConfig,
    InstrDescriptor, Oracle, OracleRegistry, OuterVariant, RunOutput, SlotCounts, StatusFlags,
    Synthesizer, TestVector, Width, CARRY_IN_MARKER,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn quick_config() -> GenConfig {
    GenConfig {
        retry_ceiling: 4096,
        ..GenConfig::default()
    }
}

fn descriptor(name: &str) -> InstrDescriptor {
    x86_catalog()
        .into_iter()
        .find(|i| i.name == name)
        .expect("instruction in catalog")
}

fn run(name: &str, width: Width, variant: OuterVariant, slots: usize, seed: u64) -> RunOutput {
    let registry = OracleRegistry::x86();
    let instr = descriptor(name);
    let oracle = registry.get(name, width).expect("oracle registered");
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    Synthesizer::new(&mut rng, 4096).run(&instr, width, variant, slots, oracle)
}

#[test]
fn and_u8_scenario() {
    let out = run("and", Width::W8, OuterVariant::Native, 48, 1);
    assert_eq!(out.rows.len(), 48);

    let row0 = out.rows[0];
    assert_eq!(row0.op1, 0);
    assert_eq!(row0.result, 0);
    assert_eq!(row0.status(), StatusFlags::ZF | StatusFlags::PF);
    assert!(!row0.carry_in());

    let row1 = out.rows[1];
    assert_eq!(row1.op1, 0xFF);
    assert_eq!(row1.result, row1.op2);
    assert_eq!(row1.status(), StatusFlags::SF | StatusFlags::PF);

    let row2 = out.rows[2];
    assert_eq!((row2.op1, row2.op2, row2.result), (0xFF, 0, 0));
}

#[test]
fn every_table_matches_its_declared_size() {
    let config = quick_config();
    let synthesis = generate_x86(&config).unwrap();
    let catalog = x86_catalog();

    let expected_tables: usize = catalog.iter().map(|i| i.widths.len()).sum();
    assert_eq!(synthesis.tables.len(), expected_tables);

    for table in &synthesis.tables {
        let instr = descriptor(table.instr);
        let slots = config.slots.for_width(table.width);
        let expected = table_len(&instr, table.width, slots);
        assert_eq!(table.declared_len, expected, "{} {}", table.instr, table.width);
        assert_eq!(table.len(), expected, "{} {}", table.instr, table.width);
        assert_eq!(table.rows().count(), expected);
    }

    let adc64 = synthesis
        .tables
        .iter()
        .find(|t| t.instr == "adc" && t.width == Width::W64)
        .unwrap();
    assert_eq!(adc64.len(), 64 * 2 * 3);
    let bt16 = synthesis
        .tables
        .iter()
        .find(|t| t.instr == "bt" && t.width == Width::W16)
        .unwrap();
    assert_eq!(bt16.len(), 48);
    assert!(!synthesis
        .tables
        .iter()
        .any(|t| t.instr.starts_with("bt") && t.width == Width::W8));
}

#[test]
fn first_operand_boundaries_in_every_run() {
    let synthesis = generate_x86(&quick_config()).unwrap();
    for table in &synthesis.tables {
        let instr = descriptor(table.instr);
        for section in &table.sections {
            let stride = instr.carry_factor();
            assert_eq!(section.rows[0].op1, 0, "{} {}", table.instr, table.width);
            assert_eq!(
                section.rows[stride].op1,
                table.width.mask(),
                "{} {}",
                table.instr,
                table.width
            );
        }
    }
}

#[test]
fn carry_rows_pair_with_their_primary_row() {
    let registry = OracleRegistry::x86();
    for name in ["adc", "sbb"] {
        for width in Width::ALL {
            for &variant in OuterVariant::variants_for(width, true) {
                let out = run(name, width, variant, 32, 7);
                assert_eq!(out.rows.len(), 64);
                let oracle = registry.get(name, width).unwrap();
                for pair in out.rows.chunks(2) {
                    let (primary, carried) = (pair[0], pair[1]);
                    assert!(!primary.carry_in());
                    assert!(carried.carry_in());
                    assert_eq!((primary.op1, primary.op2), (carried.op1, carried.op2));
                    let (result, flags) = oracle.eval(carried.op1, carried.op2, true);
                    assert_eq!(carried.result, result);
                    assert_eq!(carried.flags, flags.bits() | CARRY_IN_MARKER);
                }
            }
        }
    }
}

#[test]
fn non_carry_instructions_never_tag_rows() {
    let out = run("add", Width::W32, OuterVariant::Imm8, 48, 3);
    assert_eq!(out.rows.len(), 48);
    assert!(out.rows.iter().all(|r| !r.carry_in()));
}

/// Replays a run slot by slot, re-deriving the planner's demand from the rows emitted so far.
fn check_run(instr: &InstrDescriptor, slots: usize, out: &RunOutput) {
    let stride = instr.carry_factor();
    let mut acc = FlagAccumulator::default();
    let mut prev = acc;

    for slot in 0..slots {
        let constraint = plan(
            slot,
            slots,
            instr.active_flag_count(),
            instr.active_flags,
            &acc,
        );
        let rows = &out.rows[slot * stride..(slot + 1) * stride];
        if !out.stats.fallback_slots.contains(&slot) {
            assert!(
                !constraint.rejects(rows[0].status()),
                "{} slot {slot}: {constraint:?} violated by {:?}",
                instr.name,
                rows[0]
            );
        }
        for row in rows {
            acc.observe(row.status());
        }

        assert!(acc.set.contains(prev.set));
        assert!(acc.clear.contains(prev.clear));
        prev = acc;
    }

    assert_eq!(acc, out.accumulator);
}

#[test]
fn planner_demands_hold_and_accumulators_grow() {
    let registry = OracleRegistry::x86();
    let mut rng = ChaCha8Rng::seed_from_u64(0xC0FFEE);
    let mut synth = Synthesizer::new(&mut rng, 4096);
    for instr in x86_catalog() {
        for &width in instr.widths {
            let oracle = registry.get(instr.name, width).unwrap();
            for &variant in OuterVariant::variants_for(width, instr.imm_variants) {
                let out = synth.run(&instr, width, variant, 48, oracle);
                check_run(&instr, 48, &out);
            }
        }
    }
}

#[test]
fn native_runs_cover_every_flag_polarity() {
    for instr in x86_catalog() {
        for &width in instr.widths {
            let out = run(instr.name, width, OuterVariant::Native, 48, 11);
            assert!(
                out.accumulator.missing_set(instr.active_flags).is_empty(),
                "{} {width}: never set {:?}",
                instr.name,
                out.accumulator.missing_set(instr.active_flags)
            );
            assert!(
                out.accumulator.missing_clear(instr.active_flags).is_empty(),
                "{} {width}: never clear {:?}",
                instr.name,
                out.accumulator.missing_clear(instr.active_flags)
            );
        }
    }
}

#[test]
fn unmet_constraint_falls_back_to_last_draw() {
    let instr = InstrDescriptor {
        name: "never-carry",
        widths: &[Width::W16],
        active_flags: StatusFlags::CF,
        carry_in: false,
        imm_variants: false,
    };
    let oracle = |op1: u64, _op2: u64, _carry: bool| (op1, StatusFlags::empty());

    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let out =
        Synthesizer::new(&mut rng, 8).run(&instr, Width::W16, OuterVariant::Native, 4, &oracle);

    assert_eq!(out.rows.len(), 4);
    assert_eq!(out.stats.fallback_slots, vec![3]);
    assert_eq!(out.stats.retries, 8);
    assert_eq!(out.accumulator.missing_set(StatusFlags::CF), StatusFlags::CF);
}

#[test]
fn retries_advance_the_sample_index() {
    let instr = InstrDescriptor {
        name: "nonzero",
        widths: &[Width::W32],
        active_flags: StatusFlags::ZF,
        carry_in: false,
        imm_variants: false,
    };
    // ZF reports a non-zero first operand, so the zero drawn at index 0 is rejected.
    let oracle = |op1: u64, _op2: u64, _carry: bool| {
        let flags = if op1 != 0 {
            StatusFlags::ZF
        } else {
            StatusFlags::empty()
        };
        (op1, flags)
    };

    let mut rng = ChaCha8Rng::seed_from_u64(17);
    let out =
        Synthesizer::new(&mut rng, 8).run(&instr, Width::W32, OuterVariant::Native, 1, &oracle);

    assert_eq!(out.rows.len(), 1);
    assert_eq!(out.rows[0].op1, Width::W32.mask());
    assert_eq!(out.rows[0].op2, Width::W32.mask());
    assert_eq!(out.stats.retries, 1);
    assert!(out.stats.fallback_slots.is_empty());
}

#[test]
fn stray_oracle_bits_are_masked() {
    let instr = InstrDescriptor {
        name: "noisy",
        widths: &[Width::W8],
        active_flags: StatusFlags::ZF,
        carry_in: true,
        imm_variants: false,
    };
    let oracle = |op1: u64, op2: u64, _carry: bool| {
        (
            op1 + op2 + 0x1_0000,
            StatusFlags::from_bits_retain(0x7000) | StatusFlags::ZF,
        )
    };

    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let out =
        Synthesizer::new(&mut rng, 8).run(&instr, Width::W8, OuterVariant::Native, 6, &oracle);
    for row in &out.rows {
        assert_eq!(row.result & !0xFF, 0);
        assert_eq!(row.flags & !(StatusFlags::ZF.bits() | CARRY_IN_MARKER), 0);
    }
}

#[test]
fn missing_oracle_skips_the_width() {
    let mut registry = OracleRegistry::x86();
    assert!(registry.remove("and", Width::W64));
    assert_eq!(
        registry.widths_for("and"),
        vec![Width::W8, Width::W16, Width::W32]
    );
    assert_eq!(registry.widths_for("bt"), vec![Width::W16, Width::W32, Width::W64]);

    let config = GenConfig {
        filter: vec!["and".to_string()],
        ..quick_config()
    };
    let synthesis = generate(&config, &x86_catalog(), &registry).unwrap();
    let widths: Vec<_> = synthesis.tables.iter().map(|t| t.width).collect();
    assert_eq!(widths, vec![Width::W8, Width::W16, Width::W32]);
}

#[test]
fn same_seed_same_tables() {
    let config = GenConfig {
        slots: SlotCounts {
            u8: 12,
            u16: 12,
            u32: 12,
            u64: 12,
        },
        ..quick_config()
    };
    let a = generate_x86(&config).unwrap();
    let b = generate_x86(&config).unwrap();
    assert_eq!(a.tables, b.tables);

    let other = generate_x86(&GenConfig { seed: 99, ..config }).unwrap();
    assert_ne!(a.tables, other.tables);
}

fn parity(v: u64) -> bool {
    (v as u8).count_ones() % 2 == 0
}

fn signed(v: u64, width: Width) -> i128 {
    let shift = 64 - width.bits();
    i128::from(((v << shift) as i64) >> shift)
}

/// Independent model of the instructions, written from the architectural definitions.
fn trusted(name: &str, width: Width, row: &TestVector) -> (u64, StatusFlags) {
    let (a, b, c) = (row.op1, row.op2, row.carry_in());
    let mask = width.mask();
    let mut flags = StatusFlags::empty();
    let common = |r: u64, flags: &mut StatusFlags| {
        flags.set(StatusFlags::ZF, r == 0);
        flags.set(StatusFlags::SF, signed(r, width) < 0);
        flags.set(StatusFlags::PF, parity(r));
    };

    let result = match name {
        "and" | "or" | "xor" | "test" => {
            let r = match name {
                "or" => a | b,
                "xor" => a ^ b,
                _ => a & b,
            };
            common(r, &mut flags);
            if name == "test" {
                a
            } else {
                r
            }
        }
        "add" | "adc" => {
            let cin = u128::from(name == "adc" && c);
            let wide = u128::from(a) + u128::from(b) + cin;
            let r = wide as u64 & mask;
            flags.set(StatusFlags::CF, wide > u128::from(mask));
            let s = signed(a, width) + signed(b, width) + cin as i128;
            flags.set(StatusFlags::OF, s != signed(r, width));
            flags.set(StatusFlags::AF, (a & 0xF) + (b & 0xF) + cin as u64 > 0xF);
            common(r, &mut flags);
            r
        }
        "sub" | "sbb" | "cmp" => {
            let bin = i128::from(name == "sbb" && c);
            let wide = i128::from(a) - i128::from(b) - bin;
            let r = wide as u64 & mask;
            flags.set(StatusFlags::CF, wide < 0);
            let s = signed(a, width) - signed(b, width) - bin;
            flags.set(StatusFlags::OF, s != signed(r, width));
            flags.set(
                StatusFlags::AF,
                i128::from(a & 0xF) - i128::from(b & 0xF) - bin < 0,
            );
            common(r, &mut flags);
            if name == "cmp" {
                a
            } else {
                r
            }
        }
        "bt" | "btc" | "btr" | "bts" => {
            let bit = b % u64::from(width.bits());
            flags.set(StatusFlags::CF, (a >> bit) & 1 == 1);
            match name {
                "btc" => a ^ (1 << bit),
                "btr" => a & !(1 << bit),
                "bts" => a | (1 << bit),
                _ => a,
            }
        }
        other => panic!("no model for {other}"),
    };

    (result, flags)
}

#[test]
fn rows_round_trip_through_an_independent_model() {
    let config = GenConfig {
        slots: SlotCounts {
            u8: 24,
            u16: 24,
            u32: 24,
            u64: 24,
        },
        ..quick_config()
    };
    let synthesis = generate_x86(&config).unwrap();
    for table in &synthesis.tables {
        for row in table.rows() {
            let (result, flags) = trusted(table.instr, table.width, row);
            assert_eq!(row.result, result, "{} {} {row:?}", table.instr, table.width);
            assert_eq!(row.status(), flags, "{} {} {row:?}", table.instr, table.width);
        }
    }
}
