//! End-to-end application of generated patches

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use bps::{
    apply_batch, apply_bytes, ActionKind, ApplyConfig, ApplyState, BpsError, Interpreter, Patch,
    PatchFile, PatchWriter, TargetCheck,
};

/// Builds a random action program over `source` and the target it produces
fn random_program(rng: &mut StdRng, source: &[u8], actions: usize) -> (PatchWriter, Vec<u8>) {
    let mut writer = PatchWriter::new();
    let mut target: Vec<u8> = Vec::new();

    for _ in 0..actions {
        let length = rng.gen_range(1..=64usize);
        match rng.gen_range(0..4) {
            0 if target.len() + length <= source.len() => {
                let at = target.len();
                writer.source_read(length as u64).unwrap();
                target.extend_from_slice(&source[at..at + length]);
            }
            2 if length <= source.len() => {
                let offset = rng.gen_range(0..=source.len() - length);
                writer.source_copy(offset as u64, length as u64).unwrap();
                target.extend_from_slice(&source[offset..offset + length]);
            }
            3 if !target.is_empty() => {
                let offset = rng.gen_range(0..target.len());
                writer.target_copy(offset as u64, length as u64).unwrap();
                for i in 0..length {
                    let byte = target[offset + i];
                    target.push(byte);
                }
            }
            _ => {
                let data: Vec<u8> = (0..length).map(|_| rng.gen()).collect();
                writer.target_read(&data).unwrap();
                target.extend_from_slice(&data);
            }
        }
    }

    (writer, target)
}

fn random_source(rng: &mut StdRng, len: usize) -> Vec<u8> {
    let mut source = vec![0u8; len];
    rng.fill(&mut source[..]);
    source
}

#[test]
fn test_random_programs_apply() {
    let mut rng = StdRng::seed_from_u64(0xB951);
    for _ in 0..200 {
        let source_len = rng.gen_range(0..2048);
        let source = random_source(&mut rng, source_len);
        let actions = rng.gen_range(1..40);
        let (writer, target) = random_program(&mut rng, &source, actions);
        let bytes = writer.finish(&source, &target);

        let patch = Patch::parse(&bytes).unwrap();
        assert_eq!(patch.source_size(), source.len() as u64);
        assert_eq!(patch.target_size(), target.len() as u64);
        assert_eq!(patch.apply(&source).unwrap(), target);

        let output = apply_bytes(&bytes, &source, &ApplyConfig::default()).unwrap();
        assert!(output.verified);
        assert_eq!(output.target, target);
    }
}

#[test]
fn test_action_stats_match_program() {
    let mut rng = StdRng::seed_from_u64(3);
    let source = random_source(&mut rng, 512);
    let (writer, target) = random_program(&mut rng, &source, 100);
    let bytes = writer.finish(&source, &target);

    let stats = Patch::parse(&bytes).unwrap().action_stats().unwrap();
    assert_eq!(stats.total(), 100);
    assert_eq!(stats.output_bytes, target.len() as u64);
}

#[test]
fn test_interpreter_reaches_done() {
    let mut rng = StdRng::seed_from_u64(11);
    let source = random_source(&mut rng, 256);
    let (writer, target) = random_program(&mut rng, &source, 20);
    let bytes = writer.finish(&source, &target);
    let patch = Patch::parse(&bytes).unwrap();

    let mut interpreter = Interpreter::new(patch, &source);
    assert_eq!(interpreter.state(), ApplyState::Idle);
    let mut output = vec![0u8; target.len()];
    interpreter.run(&mut output).unwrap();
    assert_eq!(interpreter.state(), ApplyState::Done);
    assert_eq!(interpreter.actions_executed(), 20);
    assert_eq!(interpreter.cursors().output, target.len() as u64);
    assert_eq!(output, target);
}

#[test]
fn test_wrong_source_fails_before_actions() {
    let mut rng = StdRng::seed_from_u64(5);
    let source = random_source(&mut rng, 300);
    let (writer, target) = random_program(&mut rng, &source, 10);
    let bytes = writer.finish(&source, &target);
    let patch = Patch::parse(&bytes).unwrap();

    let mut other = source.clone();
    other[150] ^= 0xFF;
    let mut interpreter = Interpreter::new(patch, &other);
    let mut output = vec![0u8; target.len()];
    let err = interpreter.run(&mut output).unwrap_err();
    assert!(matches!(err, BpsError::SourceChecksumMismatch { .. }));
    assert_eq!(interpreter.state(), ApplyState::Failed(err));
    assert_eq!(interpreter.actions_executed(), 0);
}

#[test]
fn test_out_of_bounds_copy_reports_kind() {
    let source = b"0123456789";
    let mut writer = PatchWriter::new();
    // Valid encoding, but reads past the end of the source
    writer.source_copy(8, 5).unwrap();
    let bytes = writer.finish(source, b"89???");

    let err = Patch::parse(&bytes).unwrap().apply(source).unwrap_err();
    assert_eq!(err, BpsError::CursorOutOfBounds(ActionKind::SourceCopy));
}

#[test]
fn test_batch_keeps_order() {
    let mut rng = StdRng::seed_from_u64(99);
    let source = random_source(&mut rng, 1024);

    let mut expected = Vec::new();
    let mut patches = Vec::new();
    for i in 0..6 {
        let (writer, target) = random_program(&mut rng, &source, 30);
        // Every third patch declares a checksum for a target it does not produce
        let mut declared = target.clone();
        if i % 3 == 2 {
            declared[0] ^= 0x01;
        }
        patches.push(PatchFile::from_bytes(writer.finish(&source, &declared)).unwrap());
        expected.push(target);
    }

    for threshold in [1, usize::MAX] {
        let config = ApplyConfig::default().with_parallel_threshold(threshold);
        let results = apply_batch(&patches, &source, &config);
        assert_eq!(results.len(), 6);
        for (i, result) in results.iter().enumerate() {
            if i % 3 == 2 {
                let err = result.as_ref().unwrap_err();
                assert!(matches!(
                    err.as_format(),
                    Some(BpsError::TargetChecksumMismatch { .. })
                ));
            } else {
                assert_eq!(result.as_ref().unwrap().target, expected[i]);
            }
        }

        let advisory = config.with_target_check(TargetCheck::Advisory);
        let results = apply_batch(&patches, &source, &advisory);
        for (i, result) in results.into_iter().enumerate() {
            let output = result.unwrap();
            assert_eq!(output.verified, i % 3 != 2);
            assert_eq!(output.target, expected[i]);
        }
    }
}
