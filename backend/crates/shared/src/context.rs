//! Context - Request-scoped value propagation
//!
//! Defines the [`Context`] type: a typed, immutable value bag passed along a
//! request's call graph.

use http::Extensions;

/// リクエストスコープの型付き値バッグ
///
/// リクエスト処理の呼び出しグラフに沿って受け渡される不変のコンテキストです。
/// 認証済みセッションや進行中のトランザクションなど、暗黙のパラメータを
/// 型をキーとして保持します。
///
/// ## Notes
/// * `with` は派生コンテキストを返し、元のコンテキストは変更されません
/// * キーは Rust の型そのものです。モジュール内に閉じた newtype をキーに
///   することで、バインディング同士の衝突と外部からの偽造を防ぎます
/// * 取得は常に `Option` を返します。未設定・型不一致でパニックしません
///
/// ## Examples
/// ```rust
/// use kernel::context::Context;
///
/// #[derive(Clone, PartialEq, Debug)]
/// struct RequestId(u64);
///
/// let ctx = Context::new();
/// let derived = ctx.with(RequestId(7));
///
/// assert_eq!(derived.get::<RequestId>(), Some(&RequestId(7)));
/// assert_eq!(ctx.get::<RequestId>(), None);
/// ```
#[derive(Clone, Default)]
pub struct Context {
    values: Extensions,
}

impl Context {
    /// 空のコンテキストを作成
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 値を保持した派生コンテキストを返す
    ///
    /// 同じ型の値が既に存在する場合は派生コンテキスト側で上書きされます。
    /// 元のコンテキストは変更されません。
    #[must_use]
    pub fn with<T>(&self, value: T) -> Self
    where
        T: Clone + Send + Sync + 'static,
    {
        let mut next = self.clone();
        next.values.insert(value);
        next
    }

    /// 型をキーとして値を取得
    ///
    /// ## Returns
    /// 設定されていなければ `None`
    pub fn get<T>(&self) -> Option<&T>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.values.get::<T>()
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context").finish_non_exhaustive()
    }
}
