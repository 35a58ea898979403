use clap::{Args, Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "alunos-cli")]
#[command(about = "Command-line client for the student records API", long_about = None)]
struct Cli {
    /// Base URL of the students route.
    #[arg(short, long, default_value = "http://localhost:8080/alunos-api")]
    url: String,

    /// Bearer credential sent with every call.
    #[arg(short, long, env = "ALUNOS_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct StudentFields {
    #[arg(long)]
    nome: String,
    #[arg(long)]
    idade: i64,
    #[arg(long)]
    email: String,
    #[arg(long)]
    curso: String,
}

impl StudentFields {
    fn to_json(&self) -> Value {
        json!({
            "nome": self.nome,
            "idade": self.idade,
            "email": self.email,
            "curso": self.curso,
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List every student, newest first
    List,
    /// Show one student
    Get { id: String },
    /// Register a new student
    Create(StudentFields),
    /// Replace a student's fields
    Update {
        id: String,
        #[command(flatten)]
        fields: StudentFields,
    },
    /// Delete a student
    Delete { id: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let mut headers = HeaderMap::new();
    if let Some(token) = &cli.token {
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}"))?);
    }

    let (method, url, body) = match &cli.command {
        Commands::List => (Method::GET, base.to_string(), None),
        Commands::Get { id } => (Method::GET, format!("{base}/{id}"), None),
        Commands::Create(fields) => (Method::POST, base.to_string(), Some(fields.to_json())),
        Commands::Update { id, fields } => (Method::PUT, format!("{base}/{id}"), Some(fields.to_json())),
        Commands::Delete { id } => (Method::DELETE, format!("{base}/{id}"), None),
    };

    let mut request = client.request(method, url).headers(headers);
    if let Some(body) = body {
        request = request.json(&body);
    }
    print_response(request.send().await?).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => {
            let rendered = serde_json::to_string_pretty(&json)?;
            if status.is_success() {
                println!("{rendered}");
            } else {
                eprintln!("Error: API returned status {status}");
                eprintln!("{rendered}");
            }
        }
        Err(_) => {
            eprintln!("Error: API returned status {status}");
            eprintln!("Response: {text}");
        }
    }
    Ok(())
}
