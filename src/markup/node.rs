//! 标记语法的语义模型
//!
//! 规范文本、展示树、编辑器文档三种表示共享这里的节点类型

/// 一条内联注释的五个定位槽
///
/// 槽位顺序固定：表层词形、词典原形、语境释义、词源、同源词。
/// 表层词形必填；后续槽位可选但不可跳过——中间留空的槽以
/// `Some("")` 保留（编码为空 portion），完全缺省的槽为 `None`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// 表层词形（文中实际出现的形式）
    pub surface: String,
    /// 词典原形
    pub lemma: Option<String>,
    /// 语境释义
    pub meaning: Option<String>,
    /// 词源
    pub etymology: Option<String>,
    /// 同源词
    pub cognates: Option<String>,
}

impl Annotation {
    /// 只有表层词形的最小注释
    pub fn surface_only(surface: impl Into<String>) -> Self {
        Self {
            surface: surface.into(),
            lemma: None,
            meaning: None,
            etymology: None,
            cognates: None,
        }
    }

    /// 从有序 portion 列表构造
    ///
    /// 返回 `None` 的情况视为语法不合法（调用方按普通文字处理）：
    /// 列表为空、表层词形为空、超过 5 个槽位
    pub fn from_portions(portions: &[String]) -> Option<Self> {
        if portions.is_empty() || portions.len() > 5 {
            return None;
        }
        if portions[0].is_empty() {
            return None;
        }

        let slot = |i: usize| portions.get(i).cloned();

        Some(Self {
            surface: portions[0].clone(),
            lemma: slot(1),
            meaning: slot(2),
            etymology: slot(3),
            cognates: slot(4),
        })
    }

    /// 按槽位顺序导出 portion 列表，截止到最后一个出现的槽
    pub fn portions(&self) -> Vec<String> {
        let slots = [
            Some(&self.surface),
            self.lemma.as_ref(),
            self.meaning.as_ref(),
            self.etymology.as_ref(),
            self.cognates.as_ref(),
        ];

        let last = slots
            .iter()
            .rposition(|s| s.is_some())
            .unwrap_or(0);

        slots[..=last]
            .iter()
            .map(|s| s.cloned().unwrap_or_default())
            .collect()
    }
}

/// 展示树节点
///
/// 解析规范文本得到的只读树；语法不合法的片段保留为 `Text`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// 普通文字
    Text(String),
    /// 内联注释
    Annotation(Annotation),
    /// 重点标记文字
    Emphasis(String),
    /// 音频段：带标识的块级区域，内部可以再出现注释，但不能再嵌套音频段
    AudioSection { id: String, children: Vec<Node> },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn portions(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_from_portions_full() {
        let ann = Annotation::from_portions(&portions(&["ran", "run", "跑", "古英语 rinnan", "德语 rennen"]))
            .unwrap();
        assert_eq!(ann.surface, "ran");
        assert_eq!(ann.cognates.as_deref(), Some("德语 rennen"));
    }

    #[test]
    fn test_from_portions_rejects_empty_surface() {
        assert!(Annotation::from_portions(&portions(&[""])).is_none());
        assert!(Annotation::from_portions(&portions(&["", "run"])).is_none());
        assert!(Annotation::from_portions(&[]).is_none());
    }

    #[test]
    fn test_from_portions_rejects_too_many() {
        assert!(Annotation::from_portions(&portions(&["a", "b", "c", "d", "e", "f"])).is_none());
    }

    #[test]
    fn test_interior_empty_slot_is_kept() {
        // {{a||||c}} ：词典原形留空但不可跳过
        let ann = Annotation::from_portions(&portions(&["a", "", "c"])).unwrap();
        assert_eq!(ann.lemma.as_deref(), Some(""));
        assert_eq!(ann.meaning.as_deref(), Some("c"));
        assert_eq!(ann.portions(), portions(&["a", "", "c"]));
    }

    #[test]
    fn test_portions_round_trip() {
        let original = portions(&["world", "world", "n. 世界"]);
        let ann = Annotation::from_portions(&original).unwrap();
        assert_eq!(ann.portions(), original);
    }
}
