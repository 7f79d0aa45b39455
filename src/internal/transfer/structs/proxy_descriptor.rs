use core::fmt;

/// 代理描述：代理地址与可选的账号口令，构建 HTTP 客户端时一次性消费。
#[derive(Clone)]
pub struct ProxyDescriptor {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ProxyDescriptor {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            username: None,
            password: None,
        }
    }

    pub fn with_basic_auth(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }
}

/// 防止debug泄漏口令
impl fmt::Debug for ProxyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyDescriptor")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"<hidden>")
            .finish()
    }
}
