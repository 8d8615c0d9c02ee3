//! Validation of the config files under `tests/fixtures`.

use pretty_assertions::assert_eq;
use std::path::PathBuf;
use vak_rs_config::{
    AudioFormat, Command, ConfigError, ErrorKind, RawConfigTree, RawValue, SchemaTable,
    SpectFormat, TransformType, VakConfig, validate,
};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// A file defining both TRAIN and LEARNCURVE yields exactly one
/// exclusivity error naming both.
#[test]
fn train_and_learncurve_fixture_is_rejected() {
    let err = VakConfig::load_from_path(fixture("invalid_train_and_learncurve_config.toml"))
        .unwrap_err();
    match err {
        ConfigError::MutuallyExclusiveSections { first, second } => {
            assert_eq!(first, "TRAIN");
            assert_eq!(second, "LEARNCURVE");
        }
        other => panic!("unexpected error: {other}"),
    }
}

/// Dropping LEARNCURVE from the same document makes it valid.
#[test]
fn fixture_without_learncurve_is_valid() {
    let mut tree =
        RawConfigTree::read_from_path(fixture("invalid_train_and_learncurve_config.toml"))
            .expect("tree");
    assert!(tree.remove_section("LEARNCURVE").is_some());

    let config = validate(&tree, &SchemaTable::vak()).expect("config");
    let prep = config.prep.as_ref().expect("prep");
    assert_eq!(prep.train_dur, Some(50.0));
    assert_eq!(prep.val_dur, Some(15.0));
    assert_eq!(prep.test_dur, Some(30.0));
    assert_eq!(config.train.as_ref().map(|train| train.batch_size), Some(11));
    assert_eq!(config.command(), Some(Command::Train));
}

#[test]
fn train_fixture_loads() {
    let config = VakConfig::load_from_path(fixture("train_config.toml")).expect("config");
    config.require(Command::Train).expect("train section");

    let prep = config.prep.as_ref().expect("prep");
    assert_eq!(prep.audio_format, Some(AudioFormat::Cbin));
    assert_eq!(prep.annot_format.as_deref(), Some("notmat"));

    let spect = config.spect_params.as_ref().expect("spect params");
    assert_eq!(spect.fft_size, 512);
    assert_eq!(spect.step_size, 64);
    assert_eq!(spect.freq_cutoffs, Some([500.0, 10000.0]));
    assert_eq!(spect.thresh, Some(6.25));
    assert_eq!(spect.transform_type, Some(TransformType::LogSpect));

    let train = config.train.as_ref().expect("train");
    assert_eq!(train.models, vec!["TweetyNet".to_string()]);
    assert!(train.normalize_spectrograms);
    assert_eq!(train.num_epochs, 2);
    assert_eq!(train.val_step, Some(50));
    assert_eq!(train.ckpt_step, Some(200));
    assert_eq!(train.patience, Some(4));
    assert_eq!(train.num_workers, 4);
    assert_eq!(train.device, "cuda");

    let optimizer = config.models["TweetyNet"].optimizer.as_ref().expect("optimizer");
    assert_eq!(optimizer.lr, 0.001);
    assert_eq!(
        config.section_names(),
        vec![
            "PREP".to_string(),
            "SPECT_PARAMS".to_string(),
            "DATALOADER".to_string(),
            "TRAIN".to_string(),
            "TweetyNet.optimizer".to_string(),
        ]
    );
}

#[test]
fn learncurve_fixture_loads() {
    let config = VakConfig::load_from_path(fixture("learncurve_config.toml")).expect("config");
    assert_eq!(config.command(), Some(Command::Learncurve));

    let learncurve = config.learncurve.as_ref().expect("learncurve");
    assert_eq!(learncurve.train_set_durs, vec![4.0, 6.0]);
    assert_eq!(learncurve.num_replicates, 2);
    assert_eq!(learncurve.train.batch_size, 11);

    let err = config.require(Command::Train).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingSection);
}

#[test]
fn invalid_section_fixture_is_rejected() {
    let err = VakConfig::load_from_path(fixture("invalid_section_config.toml")).unwrap_err();
    match err {
        ConfigError::UnknownSection { section } => assert_eq!(section, "TRIAN"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn invalid_option_fixture_is_rejected() {
    let err = VakConfig::load_from_path(fixture("invalid_option_config.toml")).unwrap_err();
    match err {
        ConfigError::UnknownOption { section, option } => {
            assert_eq!(section, "PREP");
            assert_eq!(option, "bad_option");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn predict_json5_fixture_loads() {
    let config = VakConfig::load_from_path(fixture("predict_config.json5")).expect("config");
    assert_eq!(config.command(), Some(Command::Predict));

    let prep = config.prep.as_ref().expect("prep");
    assert_eq!(prep.spect_format, Some(SpectFormat::Mat));
    let labels: Vec<&str> = prep
        .labelset
        .iter()
        .flatten()
        .map(String::as_str)
        .collect();
    assert_eq!(labels, vec!["1", "2", "3", "6"]);

    let predict = config.predict.as_ref().expect("predict");
    assert!(!predict.majority_vote);
    assert_eq!(predict.batch_size, 1);
    assert_eq!(predict.output_dir, None);

    let network = config.models["TweetyNet"].network.as_ref().expect("network");
    assert_eq!(network["hidden_size"], RawValue::Integer(256));
}

/// Typed configs survive a serialize/deserialize cycle through JSON.
#[test]
fn validated_config_serializes() {
    let config = VakConfig::load_from_path(fixture("train_config.toml")).expect("config");
    let json = serde_json::to_string(&config).expect("json");
    let back: VakConfig = serde_json::from_str(&json).expect("decode");
    assert_eq!(config, back);
}
