//! Offline cloud-policy audit CLI.
//!
//! Validates IAM policy documents, role trust policies, encryption
//! declarations, and secret-path scoping without contacting any cloud
//! API. Exits non-zero when a critical finding is produced.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use build_gateway::audit::{AuditEvent, AuditSink, TracingAuditSink};
use build_gateway::policy::{
    encryption::{validate_encryption, EncryptionConfig},
    iam::analyze_policy,
    secrets_access::validate_secrets_access,
    trust::validate_role_assumption,
    FindingSeverity, PolicyDocument, PolicyFinding,
};
use build_gateway::secrets::{redact::sanitize_manifest, SecretRegistry};

#[derive(Parser)]
#[command(name = "policy-audit")]
#[command(about = "Offline audit of cloud policy and manifest artifacts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze an IAM policy document for wildcard grants and
    /// privilege-escalation actions
    Iam {
        /// Path to the policy JSON
        file: PathBuf,
    },
    /// Validate a role trust policy against a caller and target role
    Trust {
        /// Path to the trust policy JSON
        file: PathBuf,
        /// Caller subject, e.g. system:serviceaccount:ns-a:builder
        #[arg(long)]
        subject: String,
        /// Target role name
        #[arg(long)]
        role: String,
    },
    /// Validate a storage encryption declaration
    Encryption {
        /// Path to the encryption config JSON
        file: PathBuf,
    },
    /// Check that secret paths are scoped to the role's namespace
    Secrets {
        /// Role name requesting access
        role: String,
        /// Secret paths, e.g. ns-a/db-password
        paths: Vec<String>,
    },
    /// Redact secret material from a build manifest, writing to stdout
    Manifest {
        /// Path to the manifest file
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt().with_target(false).init();
    let cli = Cli::parse();

    match run(cli.command) {
        Ok(findings) => report(&findings),
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(2)
        }
    }
}

fn run(command: Commands) -> Result<Vec<PolicyFinding>, Box<dyn std::error::Error>> {
    match command {
        Commands::Iam { file } => {
            let text = std::fs::read_to_string(&file)?;
            let doc = PolicyDocument::parse(&text)?;
            Ok(analyze_policy(&doc))
        }
        Commands::Trust {
            file,
            subject,
            role,
        } => {
            let text = std::fs::read_to_string(&file)?;
            let doc = PolicyDocument::parse(&text)?;
            Ok(match validate_role_assumption(&doc, &subject, &role) {
                Ok(()) => Vec::new(),
                Err(finding) => vec![finding],
            })
        }
        Commands::Encryption { file } => {
            let text = std::fs::read_to_string(&file)?;
            let config: EncryptionConfig = serde_json::from_str(&text)?;
            Ok(validate_encryption(&config))
        }
        Commands::Secrets { role, paths } => Ok(validate_secrets_access(&role, &paths)),
        Commands::Manifest { file } => {
            let text = std::fs::read_to_string(&file)?;
            let registry = SecretRegistry::new();
            print!("{}", sanitize_manifest(&registry, &text));
            Ok(Vec::new())
        }
    }
}

/// Print findings as JSON lines and feed them to the audit sink. Critical
/// findings fail the run.
fn report(findings: &[PolicyFinding]) -> ExitCode {
    let sink = TracingAuditSink;
    let mut critical = false;
    for finding in findings {
        if let Ok(json) = serde_json::to_string(finding) {
            println!("{json}");
        }
        sink.record(&AuditEvent::Policy {
            document: "cli".to_string(),
            finding: finding.clone(),
        });
        if finding.severity == FindingSeverity::Critical {
            critical = true;
        }
    }
    if critical {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
