//! 액면분할 수집기 CLI.

use clap::{Parser, Subcommand};
use splits_collector::{modules, CollectorConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "splits-collector")]
#[command(about = "IDX Stock Split Reconciliation Collector", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// 소스 공시와 저장소를 한 번 동기화
    Sync,

    /// 데몬 모드: 주기적으로 동기화 실행
    Daemon,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // 로깅 초기화
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("splits_collector={}", cli.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("IDX Split Collector 시작");

    // 설정 로드
    let config = CollectorConfig::from_env()?;
    tracing::debug!(pages = config.source.page_urls.len(), "설정 로드 완료");

    // DB 연결
    let pool = sqlx::PgPool::connect(&config.database_url).await?;
    tracing::info!("데이터베이스 연결 성공");

    // 명령 실행
    match cli.command {
        Commands::Sync => {
            let stats = modules::sync_splits(&pool, &config).await?;
            stats.log_summary("액면분할 동기화");
        }
        Commands::Daemon => {
            tracing::info!(
                "=== 데몬 모드 시작 (주기: {}분) ===",
                config.daemon.interval_minutes
            );

            let mut interval = tokio::time::interval(config.daemon.interval());
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("종료 신호 수신, 데몬 종료 중...");
                        break;
                    }
                    _ = interval.tick() => {
                        match modules::sync_splits(&pool, &config).await {
                            Ok(stats) => {
                                stats.log_summary("액면분할 동기화");
                            }
                            Err(e) => {
                                tracing::error!("동기화 실패: {}", e);
                            }
                        }
                    }
                }
            }
        }
    }

    pool.close().await;
    tracing::info!("IDX Split Collector 종료");

    Ok(())
}
