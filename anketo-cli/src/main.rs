//! anketo — command-line variant of the FHIR questionnaire client.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use anketo_client::{merge_answers, populate_for_patient, FhirClient};
use anketo_core::{build_response, CodeRegistry, Item, Resource};

#[derive(Parser)]
#[command(name = "anketo", about = "FHIR questionnaire client", version)]
struct Cli {
    /// Base URL of the remote FHIR server
    #[arg(
        long,
        env = "ANKETO_BASE_URL",
        default_value = "http://localhost:8080/fhir"
    )]
    base_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a patient
    CreatePatient {
        /// Given name
        #[arg(long)]
        given: String,
        /// Family name
        #[arg(long)]
        family: String,
    },
    /// List patients
    Patients {
        #[arg(long, default_value_t = 50)]
        count: u32,
    },
    /// Upload a questionnaire document
    Upload {
        /// Path to a Questionnaire JSON file
        file: PathBuf,
    },
    /// Populate a questionnaire for a patient and fill in the rest
    Fill {
        /// Questionnaire ID
        #[arg(long)]
        questionnaire: String,
        /// Patient ID
        #[arg(long)]
        patient: String,
        /// Submit without asking for confirmation
        #[arg(long)]
        yes: bool,
    },
    /// Show a stored questionnaire response
    Show { response_id: String },
    /// List a patient's responses, newest first
    History {
        /// Patient ID
        #[arg(long)]
        patient: String,
        #[arg(long, default_value_t = 20)]
        count: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let client = FhirClient::new(&cli.base_url);
    let codes = CodeRegistry::with_defaults();

    match cli.command {
        Commands::CreatePatient { given, family } => {
            let id = client.create_patient(&given, &family).await?;
            println!("Patient created with ID: {id}");
        }
        Commands::Patients { count } => {
            let patients = client.list_patients(count).await?;
            if patients.is_empty() {
                println!("No patients found.");
            }
            for patient in patients {
                println!("{}  {}", patient.id, patient.name);
            }
        }
        Commands::Upload { file } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let document = serde_json::from_str(&content)
                .with_context(|| format!("parsing {}", file.display()))?;
            let id = client.upload_questionnaire(&document).await?;
            println!("Questionnaire uploaded with ID: {id}");
        }
        Commands::Fill {
            questionnaire,
            patient,
            yes,
        } => {
            fill(&client, &codes, &questionnaire, &patient, yes).await?;
        }
        Commands::Show { response_id } => {
            let response = client.fetch_response(&response_id).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::History { patient, count } => {
            let responses = client.list_responses_for_patient(&patient, count).await?;
            if responses.is_empty() {
                println!("No responses found.");
            }
            for response in &responses {
                print_response_line(response);
            }
        }
    }

    Ok(())
}

/// Populate, prompt for every unanswered item, preview, confirm, submit.
async fn fill(
    client: &FhirClient,
    codes: &CodeRegistry,
    questionnaire_id: &str,
    patient_id: &str,
    assume_yes: bool,
) -> anyhow::Result<()> {
    let skeleton = populate_for_patient(client, questionnaire_id, patient_id).await?;

    println!("--- Filling unanswered questions ---");
    let mut fields = Vec::new();
    for item in &skeleton {
        if item.answer.is_some() {
            continue;
        }
        let answer = prompt(&format!("{}: ", item.label()))?;
        fields.push((item.link_id.clone(), answer));
    }

    let items = match merge_answers(codes, &skeleton, &fields) {
        Ok(items) => items,
        Err(errors) => {
            for error in &errors {
                eprintln!("{error}");
            }
            bail!("validation failed for {} field(s), nothing saved", errors.len());
        }
    };

    let preview = build_response(
        &client.questionnaire_url(questionnaire_id),
        patient_id,
        &items,
    );
    println!("--- Final QuestionnaireResponse ---");
    println!("{}", serde_json::to_string_pretty(&preview)?);

    if !assume_yes {
        let confirm = prompt("Upload to FHIR server? (y/n): ")?;
        if !confirm.eq_ignore_ascii_case("y") {
            println!("Aborted, nothing saved.");
            return Ok(());
        }
    }

    let id = client
        .save_response(questionnaire_id, patient_id, &items)
        .await?;
    println!("QuestionnaireResponse created with ID: {id}");
    println!("{}/QuestionnaireResponse/{id}", client.base_url());

    Ok(())
}

fn print_response_line(response: &serde_json::Value) {
    let resource = Resource::from_value(response.clone()).ok();
    let id = resource
        .as_ref()
        .and_then(|r| r.id.as_deref())
        .unwrap_or("?");
    let date = resource
        .as_ref()
        .and_then(|r| r.updated_date())
        .unwrap_or("");

    println!("{id}  {date}");
    for item in Item::list_from(response) {
        let value = item
            .answer
            .as_ref()
            .map(|answer| answer.display())
            .unwrap_or_else(|| "–".to_string());
        println!("    {}: {}", item.label(), value);
    }
}

fn prompt(label: &str) -> io::Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
