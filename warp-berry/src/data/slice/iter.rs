use crate::Idx2d;

/// 行优先索引迭代器.
///
/// 切片上所有需要 "扫描顺序" 的地方都用它, 以保证结果与扫描顺序相关的部分
/// (例如同权重错误点的先后) 是确定的.
#[derive(Debug, Clone)]
pub struct PosIter {
    cur_h: usize,
    cur_w: usize,
    h: usize,
    w: usize,
}

impl PosIter {
    /// 遍历形状为 `(h, w)` 的切片.
    #[inline]
    pub fn new((h, w): Idx2d) -> Self {
        Self {
            cur_h: 0,
            cur_w: 0,
            h,
            w,
        }
    }
}

impl Iterator for PosIter {
    type Item = Idx2d;

    fn next(&mut self) -> Option<Self::Item> {
        if self.w == 0 || self.cur_h >= self.h {
            return None;
        }
        let pos = (self.cur_h, self.cur_w);
        self.cur_w += 1;
        if self.cur_w == self.w {
            self.cur_w = 0;
            self.cur_h += 1;
        }
        Some(pos)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = if self.w == 0 || self.cur_h >= self.h {
            0
        } else {
            (self.h - self.cur_h) * self.w - self.cur_w
        };
        (left, Some(left))
    }
}

impl ExactSizeIterator for PosIter {}
