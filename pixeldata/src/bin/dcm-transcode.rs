//! A CLI tool for transcoding a DICOM file
//! to another transfer syntax.
use clap::Parser;
use dcmkit_core::uids;
use dcmkit_encoding::TransferSyntax;
use dcmkit_object::open_file;
use dcmkit_pixeldata::{TranscodePolicy, Transcoder};
use dcmkit_transfer_syntax_registry::TransferSyntaxRegistry;
use snafu::{OptionExt, Report, Whatever};
use std::path::PathBuf;
use tracing::{info, Level};

/// Exit code for when an error emerged while reading the DICOM file.
const ERROR_READ: i32 = -2;
/// Exit code for when an error emerged while transcoding the file.
const ERROR_TRANSCODE: i32 = -3;
/// Exit code for when an error emerged while writing the file.
const ERROR_WRITE: i32 = -4;
/// Exit code for any other error.
const ERROR_OTHER: i32 = -128;

/// Transcode a DICOM file
#[derive(Debug, Parser)]
#[command(version)]
struct App {
    file: PathBuf,
    /// The output file (default is to change the extension to .new.dcm)
    #[clap(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Target transfer syntax
    #[clap(flatten)]
    target_ts: TargetTransferSyntax,

    /// Allow a lossy target transfer syntax
    #[clap(long = "allow-lossy")]
    allow_lossy: bool,

    /// Fail if a decoded frame does not have the expected size
    #[clap(long = "require-fidelity")]
    require_fidelity: bool,

    /// Retain the original implementation class UID and version name
    #[clap(long)]
    retain_implementation: bool,

    /// Verbose mode
    #[clap(short = 'v', long = "verbose")]
    verbose: bool,
}

/// Specifier for the target transfer syntax
#[derive(Debug, Parser)]
#[group(required = true, multiple = false, id = "transfer_syntax")]
struct TargetTransferSyntax {
    /// Transcode to the Transfer Syntax indicated by UID
    #[clap(long = "ts")]
    ts: Option<String>,

    /// Transcode to Explicit VR Little Endian
    #[clap(long = "expl-vr-le")]
    explicit_vr_le: bool,

    /// Transcode to Implicit VR Little Endian
    #[clap(long = "impl-vr-le")]
    implicit_vr_le: bool,

    /// Transcode to Explicit VR Big Endian
    #[clap(long = "expl-vr-be")]
    explicit_vr_be: bool,
}

impl TargetTransferSyntax {
    fn resolve(
        &self,
        registry: &TransferSyntaxRegistry,
    ) -> Result<&'static TransferSyntax, Whatever> {
        let uid = match self {
            TargetTransferSyntax {
                explicit_vr_le: true,
                ..
            } => uids::EXPLICIT_VR_LITTLE_ENDIAN,
            TargetTransferSyntax {
                implicit_vr_le: true,
                ..
            } => uids::IMPLICIT_VR_LITTLE_ENDIAN,
            TargetTransferSyntax {
                explicit_vr_be: true,
                ..
            } => uids::EXPLICIT_VR_BIG_ENDIAN,
            TargetTransferSyntax { ts: Some(ts), .. } => ts.as_str(),
            // none specified
            _ => snafu::whatever!("No target transfer syntax specified"),
        };
        registry
            .transfer_syntax(uid)
            .with_whatever_context(|| format!("Unknown transfer syntax {}", uid))
    }
}

fn main() {
    run().unwrap_or_else(|e| {
        eprintln!("{}", Report::from_error(e));
        std::process::exit(ERROR_OTHER);
    });
}

fn run() -> Result<(), Whatever> {
    let App {
        file,
        output,
        target_ts,
        allow_lossy,
        require_fidelity,
        retain_implementation,
        verbose,
    } = App::parse();

    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(if verbose { Level::DEBUG } else { Level::INFO })
            .finish(),
    )
    .unwrap_or_else(|e| {
        eprintln!("{}", snafu::Report::from_error(e));
    });

    let output = output.unwrap_or_else(|| {
        let mut file = file.clone();
        file.set_extension("new.dcm");
        file
    });

    let registry = TransferSyntaxRegistry::with_defaults();
    let ts = target_ts.resolve(&registry)?;

    let obj = open_file(&file).unwrap_or_else(|e| {
        eprintln!("{}", Report::from_error(e));
        std::process::exit(ERROR_READ);
    });

    let policy = TranscodePolicy::new()
        .allow_lossy(allow_lossy)
        .require_fidelity(require_fidelity);
    let transcoder = Transcoder::with_policy(&registry, policy);

    let mut obj = transcoder.transcode_file(&obj, ts).unwrap_or_else(|e| {
        eprintln!("{}", Report::from_error(e));
        std::process::exit(ERROR_TRANSCODE);
    });

    // override implementation class UID and version name
    if !retain_implementation {
        let meta = obj.meta_mut();
        meta.implementation_class_uid = dcmkit_object::IMPLEMENTATION_CLASS_UID.to_string();
        meta.implementation_version_name =
            Some(dcmkit_object::IMPLEMENTATION_VERSION_NAME.to_string());
        meta.update_information_group_length();
    }

    obj.write_to_file(&output).unwrap_or_else(|e| {
        eprintln!("{}", Report::from_error(e));
        std::process::exit(ERROR_WRITE);
    });

    info!("{} written in {}", output.display(), ts.name());
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::App;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        App::command().debug_assert();
    }
}
