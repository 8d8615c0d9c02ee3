//! The built-in section table for vak experiment configs.

use super::{DefaultValue, OptionKind, OptionSpec, SchemaTable, SectionSchema};

/// Models that may be named in `models` options and model sub-sections.
pub const KNOWN_MODELS: &[&str] = &["TweetyNet", "TeenyTweetyNet"];
/// Per-model hyperparameter sub-sections, e.g. `[TweetyNet.optimizer]`.
pub const MODEL_SUBSECTIONS: &[&str] = &["optimizer", "network", "loss", "metrics"];
/// Sections that select what the tool runs; at most one per file.
pub const COMMAND_SECTIONS: &[&str] = &["TRAIN", "LEARNCURVE", "EVAL", "PREDICT"];

pub const AUDIO_FORMATS: &[&str] = &["cbin", "wav"];
pub const SPECT_FORMATS: &[&str] = &["mat", "npz"];
pub const TRANSFORM_TYPES: &[&str] = &["log_spect", "log_spect_plus_one"];

const DEFAULT_NUM_WORKERS: u64 = 2;
const DEFAULT_DEVICE: &str = "cpu";
const DEFAULT_LEARNING_RATE: f64 = 0.001;

impl SchemaTable {
    /// Schema table for every section a vak config may contain.
    pub fn vak() -> Self {
        let mut table = Self::empty()
            .with_section(prep())
            .with_section(spect_params())
            .with_section(dataloader())
            .with_section(command_section("TRAIN", train_options()))
            .with_section(command_section("LEARNCURVE", learncurve_options()))
            .with_section(command_section("EVAL", eval_options()))
            .with_section(command_section("PREDICT", predict_options()));

        for model in KNOWN_MODELS {
            for sub in MODEL_SUBSECTIONS {
                table = table.with_section(model_section(model, sub));
            }
        }
        table
    }
}

fn prep() -> SectionSchema {
    SectionSchema::new("PREP")
        .options([
            OptionSpec::optional("data_dir", OptionKind::Path),
            OptionSpec::optional("output_dir", OptionKind::Path),
            OptionSpec::optional("audio_format", OptionKind::Choice(AUDIO_FORMATS)),
            OptionSpec::optional("spect_format", OptionKind::Choice(SPECT_FORMATS)),
            OptionSpec::optional("annot_format", OptionKind::String),
            OptionSpec::optional("annot_file", OptionKind::Path),
            OptionSpec::optional("labelset", OptionKind::Labelset),
            OptionSpec::optional("train_dur", OptionKind::Float),
            OptionSpec::optional("val_dur", OptionKind::Float),
            OptionSpec::optional("test_dur", OptionKind::Float),
        ])
        .one_of(&["audio_format", "spect_format"])
}

fn spect_params() -> SectionSchema {
    SectionSchema::new("SPECT_PARAMS").options([
        OptionSpec::defaulted("fft_size", OptionKind::Count, DefaultValue::Count(512)),
        OptionSpec::defaulted("step_size", OptionKind::Count, DefaultValue::Count(64)),
        OptionSpec::optional("freq_cutoffs", OptionKind::FloatList { len: Some(2) }),
        OptionSpec::optional("thresh", OptionKind::Float),
        OptionSpec::optional("transform_type", OptionKind::Choice(TRANSFORM_TYPES)),
        OptionSpec::defaulted("spect_key", OptionKind::String, DefaultValue::Str("s")),
        OptionSpec::defaulted("freq_key", OptionKind::String, DefaultValue::Str("f")),
        OptionSpec::defaulted("timebins_key", OptionKind::String, DefaultValue::Str("t")),
        OptionSpec::defaulted(
            "audio_path_key",
            OptionKind::String,
            DefaultValue::Str("audio_path"),
        ),
    ])
}

fn dataloader() -> SectionSchema {
    SectionSchema::new("DATALOADER")
        .options([OptionSpec::required("window_size", OptionKind::Count)])
}

/// Command sections exclude every other command section.
fn command_section(name: &str, options: Vec<OptionSpec>) -> SectionSchema {
    SectionSchema::new(name).options(options).exclusive_with(
        COMMAND_SECTIONS
            .iter()
            .filter(|other| **other != name)
            .copied(),
    )
}

/// Options shared by every section that loads a trained or training model.
fn runtime_options() -> Vec<OptionSpec> {
    vec![
        OptionSpec::defaulted(
            "num_workers",
            OptionKind::Count,
            DefaultValue::Count(DEFAULT_NUM_WORKERS),
        ),
        OptionSpec::defaulted("device", OptionKind::String, DefaultValue::Str(DEFAULT_DEVICE)),
        OptionSpec::optional("csv_path", OptionKind::Path),
        OptionSpec::optional("spect_scaler_path", OptionKind::Path),
    ]
}

fn train_options() -> Vec<OptionSpec> {
    let mut options = vec![
        OptionSpec::required("models", OptionKind::Names(KNOWN_MODELS)),
        OptionSpec::required("root_results_dir", OptionKind::Path),
        OptionSpec::required("batch_size", OptionKind::Count),
        OptionSpec::required("num_epochs", OptionKind::Count),
        OptionSpec::defaulted(
            "normalize_spectrograms",
            OptionKind::Boolean,
            DefaultValue::Boolean(false),
        ),
        OptionSpec::defaulted("shuffle", OptionKind::Boolean, DefaultValue::Boolean(true)),
        OptionSpec::optional("val_step", OptionKind::Count),
        OptionSpec::optional("ckpt_step", OptionKind::Count),
        OptionSpec::optional("patience", OptionKind::Count),
        OptionSpec::optional("checkpoint_path", OptionKind::Path),
    ];
    options.extend(runtime_options());
    options
}

fn learncurve_options() -> Vec<OptionSpec> {
    let mut options = train_options();
    options.extend([
        OptionSpec::required("train_set_durs", OptionKind::FloatList { len: None }),
        OptionSpec::required("num_replicates", OptionKind::Count),
        OptionSpec::optional("previous_run_path", OptionKind::Path),
    ]);
    options
}

fn eval_options() -> Vec<OptionSpec> {
    let mut options = vec![
        OptionSpec::required("models", OptionKind::Names(KNOWN_MODELS)),
        OptionSpec::required("checkpoint_path", OptionKind::Path),
        OptionSpec::required("labelmap_path", OptionKind::Path),
        OptionSpec::required("output_dir", OptionKind::Path),
        OptionSpec::required("batch_size", OptionKind::Count),
    ];
    options.extend(runtime_options());
    options
}

fn predict_options() -> Vec<OptionSpec> {
    let mut options = vec![
        OptionSpec::required("models", OptionKind::Names(KNOWN_MODELS)),
        OptionSpec::required("checkpoint_path", OptionKind::Path),
        OptionSpec::required("labelmap_path", OptionKind::Path),
        OptionSpec::defaulted("batch_size", OptionKind::Count, DefaultValue::Count(1)),
        OptionSpec::optional("annot_csv_filename", OptionKind::String),
        OptionSpec::optional("output_dir", OptionKind::Path),
        OptionSpec::optional("min_segment_dur", OptionKind::Float),
        OptionSpec::defaulted("majority_vote", OptionKind::Boolean, DefaultValue::Boolean(true)),
    ];
    options.extend(runtime_options());
    options
}

fn model_section(model: &str, sub: &str) -> SectionSchema {
    let schema = SectionSchema::new(format!("{model}.{sub}"));
    match sub {
        "optimizer" => schema.options([OptionSpec::defaulted(
            "lr",
            OptionKind::Float,
            DefaultValue::Float(DEFAULT_LEARNING_RATE),
        )]),
        _ => schema.open(),
    }
}
