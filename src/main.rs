//src/main.rs

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use agro_produtores::{AppConfig, AppError, AppState, DashboardMode, handlers};

#[derive(Debug, Parser)]
#[command(name = "agro", about = "Cadastro de produtores rurais e dashboard", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Operações de produtores
    #[command(subcommand)]
    Produtores(ProdutoresCommand),

    /// Resumo das fazendas (totais, estados, culturas e uso do solo)
    Dashboard {
        /// local | servidor (padrão: DASHBOARD_MODE)
        #[arg(long)]
        modo: Option<DashboardMode>,
    },
}

#[derive(Debug, Subcommand)]
enum ProdutoresCommand {
    Listar,
    Obter { id: i64 },
    Buscar { cpf_cnpj: String },
    /// Cadastra (ou anexa fazendas, se o CPF/CNPJ já existir)
    Cadastrar {
        #[arg(long)]
        arquivo: PathBuf,
    },
    Editar {
        id: i64,
        #[arg(long)]
        arquivo: PathBuf,
    },
    Excluir { id: i64 },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logs vão para o stderr; o stdout fica só com o JSON
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();

    let mut config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("🔥 Configuração inválida: {:#}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Command::Dashboard { modo: Some(modo) } = &cli.command {
        config.dashboard_mode = *modo;
    }

    let app_state = match AppState::new(config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("🔥 Falha ao inicializar o estado da aplicação: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Command::Dashboard { .. } => handlers::dashboard::get_dashboard(&app_state).await,
        Command::Produtores(cmd) => match cmd {
            ProdutoresCommand::Listar => handlers::produtores::list_producers(&app_state).await,
            ProdutoresCommand::Obter { id } => handlers::produtores::get_producer(&app_state, id).await,
            ProdutoresCommand::Buscar { cpf_cnpj } => {
                handlers::produtores::find_by_cpf_cnpj(&app_state, &cpf_cnpj).await
            }
            ProdutoresCommand::Cadastrar { arquivo } => {
                handlers::produtores::register_producer(&app_state, &arquivo).await
            }
            ProdutoresCommand::Editar { id, arquivo } => {
                handlers::produtores::edit_producer(&app_state, id, &arquivo).await
            }
            ProdutoresCommand::Excluir { id } => handlers::produtores::delete_producer(&app_state, id).await,
        },
    };

    match result {
        Ok(value) => {
            match serde_json::to_string_pretty(&value) {
                Ok(out) => println!("{}", out),
                Err(_) => println!("{}", value),
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            // Falhas de operação da store já foram logadas por ela
            if let AppError::Internal(inner) = &e {
                tracing::error!("🔥 Erro interno: {:?}", inner);
            }
            eprintln!("Erro: {}", e.user_message());
            ExitCode::FAILURE
        }
    }
}
