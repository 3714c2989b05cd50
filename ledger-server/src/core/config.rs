/// 服务器配置 - 订单台账服务的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | TIMEZONE | Asia/Seoul | 营业日时区 (统计分桶) |
/// | ENVIRONMENT | development | 运行环境 |
/// | POINTS_EARN_RATE | 0.02 | 积分累积比例 |
/// | POINTS_ACCUMULATION | true | 是否开启积分累积 |
/// | NOTIFY_WEBHOOK_URL | (无) | 完成通知 webhook 地址 |
/// | CHANNEL_CAPACITY | 1024 | 变更事件广播通道容量 |
/// | LOG_DIR | (无) | 日志文件目录 (为空则仅输出到终端) |
///
/// # 示例
///
/// ```ignore
/// TIMEZONE=Asia/Seoul HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 营业日时区 - 订单日期与结算日期的分桶基准
    pub timezone: chrono_tz::Tz,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 积分累积比例 (消费金额 × 比例 = 累积积分)
    pub points_earn_rate: rust_decimal::Decimal,
    /// 是否开启积分累积
    pub points_accumulation: bool,
    /// 完成通知 webhook 地址 (为空则不发送)
    pub notify_webhook_url: Option<String>,
    /// 变更事件广播通道容量
    pub channel_capacity: usize,
    /// 日志文件目录
    pub log_dir: Option<String>,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            timezone: std::env::var("TIMEZONE")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(chrono_tz::Asia::Seoul),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            points_earn_rate: std::env::var("POINTS_EARN_RATE")
                .ok()
                .and_then(|r| r.parse().ok())
                .unwrap_or_else(|| rust_decimal::Decimal::new(2, 2)),
            points_accumulation: std::env::var("POINTS_ACCUMULATION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            notify_webhook_url: std::env::var("NOTIFY_WEBHOOK_URL").ok(),
            channel_capacity: std::env::var("CHANNEL_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1024),
            log_dir: std::env::var("LOG_DIR").ok(),
        }
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
