// 有序、按身份去重的注册列表

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// 有序注册表
///
/// 保存共享句柄 (`Arc<T>`)，按插入顺序排列，同一个句柄只能出现一次。
/// 是否重复由句柄身份（指针地址）决定，而不是结构相等：两个内容相同但
/// 分别构造的实例是两条不同的注册。
///
/// 列表的修改在写锁内完成，每次调用要么完整生效要么不生效；
/// 读取方通过 [`Registry::snapshot`] 拿到当前列表的副本后再迭代，
/// 因此迭代期间的并发注册不会影响正在进行的调用。
pub struct Registry<T: ?Sized> {
    entries: RwLock<Vec<Arc<T>>>,
}

impl<T: ?Sized> Registry<T> {
    /// 创建空注册表
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    /// 追加一个句柄，已存在时返回 `false`
    pub fn add(&self, entry: Arc<T>) -> bool {
        let mut entries = self.write();
        if entries.iter().any(|existing| same_entry(existing, &entry)) {
            return false;
        }
        entries.push(entry);
        true
    }

    /// 移除一个句柄，不存在时返回 `false`
    pub fn remove(&self, entry: &Arc<T>) -> bool {
        let mut entries = self.write();
        match entries.iter().position(|existing| same_entry(existing, entry)) {
            Some(index) => {
                entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// 是否已注册该句柄
    pub fn contains(&self, entry: &Arc<T>) -> bool {
        self.read().iter().any(|existing| same_entry(existing, entry))
    }

    /// 当前注册列表的有序副本
    pub fn snapshot(&self) -> Vec<Arc<T>> {
        self.read().clone()
    }

    /// 清空注册表
    pub fn clear(&self) {
        self.write().clear();
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // 锁中毒只说明某个持锁线程 panic 过，列表本身始终处于一致状态
    fn read(&self) -> RwLockReadGuard<'_, Vec<Arc<T>>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Arc<T>>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: ?Sized> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> std::fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry").field("len", &self.len()).finish()
    }
}

/// 按句柄身份比较，忽略 trait 对象的虚表指针
pub fn same_entry<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
