//! 代码特征检测子模块
//!
//! # 设计思路
//!
//! 当用户从浏览器（如 GitHub）复制代码时，浏览器会同时放入文本和一张
//! 渲染预览图。若按固定格式优先级处理，图片会压过文本，历史里存下的
//! 是一张截图而不是代码本身。本模块识别文本中的代码特征，供分类器在
//! "图片 + 代码文本"并存时改选文本。
//!
//! # 实现思路
//!
//! - 使用 `RegexSet` 进行一次性多模式匹配，性能优于逐条匹配。
//! - 通过 `once_cell::sync::Lazy` 在首次调用时编译正则，后续零成本复用。

use once_cell::sync::Lazy;
use regex::RegexSet;

/// 预编译的正则表达式集合：代码特征模式
///
/// 覆盖的特征包括：
/// 1. 常见语言关键字行首（fn, function, const, let, class, struct, def 等）
/// 2. Rust 属性（#![], #[...]）与常用宏（format!, println!, eprintln!）
/// 3. 闭包参数（|x|）与 C/C++ 预处理指令（#include, #define 等）
/// 4. 类型箭头 / 匹配臂箭头（->, =>）与作用域运算符（::）
/// 5. 引用与可变绑定（&var, &mut var, let mut）
/// 6. Result 惯用法（Ok(), Err(), unwrap(), expect(), map_err()）
static CODE_PATTERNS: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        r"(?m)^[\s]*(fn|function|const|let|var|class|struct|impl|mod|use|import|export|def|async|pub|private|static|interface|type|enum|trait)\s",
        r"#!\[",
        r"#\[[\w\s:]+\]",
        r"format!\(",
        r"println!\(",
        r"eprintln!\(",
        r"\|\s*\w+\s*\|",
        r"(?m)^[\s]*#(include|define|ifdef|ifndef|endif)",
        r"->",
        r"=>",
        r"::",
        r"&mut\s+\w+",
        r"let\s+mut\s+",
        r"Ok\(",
        r"Err\(",
        r"unwrap\(\)",
        r"expect\(",
        r"map_err\(",
    ])
    .expect("代码特征正则集合编译失败")
});

/// 判断文本是否可能是代码
///
/// 极短且无换行的文本直接排除，避免把普通短语误判为代码。
pub fn is_likely_code(text: &str) -> bool {
    if text.len() < 5 && !text.contains('\n') {
        return false;
    }
    CODE_PATTERNS.is_match(text)
}
